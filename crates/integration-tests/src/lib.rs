//! Integration tests for Golden Fig.
//!
//! # Test Categories
//!
//! - `order_lifecycle` - Status transition semantics and the inventory pairing
//! - `coupon_rules` - Redemption validation and discount caps
//! - `checkout_totals` - Provider line items and totals arithmetic
//! - `webhook_signatures` - Stripe signature verification
//!
//! Shared builders for domain fixtures live here.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::Utc;
use rust_decimal::Decimal;

use golden_fig_commerce::models::{Cart, CartItem, Coupon, Owner};
use golden_fig_core::{
    CartId, CartItemId, CouponId, CouponKind, CurrencyCode, ProductId, UserId,
};

/// Build a cart owned by user 1 with the given `(product, price, quantity)`
/// lines.
#[must_use]
pub fn cart_with(items: Vec<(i32, Decimal, i32)>) -> Cart {
    Cart {
        id: CartId::new(1),
        owner: Owner::User(UserId::new(1)),
        coupon_code: None,
        items: items
            .into_iter()
            .map(|(product, price, quantity)| CartItem {
                id: CartItemId::new(product),
                product_id: ProductId::new(product),
                product_name: format!("Product {product}"),
                product_slug: format!("product-{product}"),
                unit_price: price,
                currency: CurrencyCode::USD,
                quantity,
                image_url: None,
            })
            .collect(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Build an unbounded, active coupon.
#[must_use]
pub fn coupon(kind: CouponKind, value: Decimal) -> Coupon {
    Coupon {
        id: CouponId::new(1),
        code: "TESTCODE".to_owned(),
        kind,
        value,
        min_order_amount: None,
        max_discount: None,
        starts_at: None,
        ends_at: None,
        usage_limit: None,
        usage_count: 0,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
