//! Checkout line-item construction.
//!
//! Pure translation from a cart to payment-provider line items (minor
//! currency units), plus the totals preview shown on the cart page. The
//! actual checkout-session call lives in the storefront's Stripe client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use golden_fig_core::Price;

use crate::coupon;
use crate::models::{Cart, CartTotals, Coupon};

/// A checkout line item in payment-provider terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Product display name.
    pub name: String,
    /// Unit amount in the currency's minor unit (e.g., cents).
    pub unit_amount: i64,
    pub quantity: i64,
    /// Lowercase ISO 4217 code, as the provider expects.
    pub currency: &'static str,
}

/// Errors building checkout input from a cart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("price for {product} does not fit in minor units")]
    AmountOverflow { product: String },

    #[error("coupon rejected: {0}")]
    CouponRejected(#[from] coupon::CouponError),
}

/// Build provider line items from the cart's lines.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for a cart with no lines, or
/// `CheckoutError::AmountOverflow` if a unit price cannot be expressed in
/// minor units.
pub fn build_line_items(cart: &Cart) -> Result<Vec<LineItem>, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    cart.items
        .iter()
        .map(|item| {
            let unit_amount = Price::new(item.unit_price, item.currency)
                .as_minor_units()
                .ok_or_else(|| CheckoutError::AmountOverflow {
                    product: item.product_name.clone(),
                })?;
            Ok(LineItem {
                name: item.product_name.clone(),
                unit_amount,
                quantity: i64::from(item.quantity),
                currency: item.currency.code(),
            })
        })
        .collect()
}

/// Totals preview for a cart, applying the attached coupon when it is
/// currently redeemable. An invalid coupon previews as a zero discount
/// rather than an error - the cart page shows totals either way.
#[must_use]
pub fn totals(cart: &Cart, attached_coupon: Option<&Coupon>, now: DateTime<Utc>) -> CartTotals {
    let subtotal = cart.subtotal();
    let discount = attached_coupon
        .and_then(|c| coupon::validate_and_discount(c, subtotal, now).ok())
        .unwrap_or(Decimal::ZERO);

    CartTotals {
        subtotal,
        discount,
        total: (subtotal - discount).max(Decimal::ZERO),
        item_count: cart.item_count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use golden_fig_core::{CartId, CartItemId, CouponId, CouponKind, CurrencyCode, ProductId, UserId};

    use crate::models::{CartItem, Owner};

    fn cart_with(items: Vec<(i32, Decimal, i32)>) -> Cart {
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

    fn percent_coupon(value: i64) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "SAVE".to_owned(),
            kind: CouponKind::Percentage,
            value: Decimal::new(value, 0),
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

    #[test]
    fn test_line_items_in_minor_units() {
        let cart = cart_with(vec![
            (1, Decimal::new(1999, 2), 2),
            (2, Decimal::new(500, 2), 1),
        ]);
        let items = build_line_items(&cart).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.first().unwrap().unit_amount, 1999);
        assert_eq!(items.first().unwrap().quantity, 2);
        assert_eq!(items.first().unwrap().currency, "usd");
        assert_eq!(items.get(1).unwrap().unit_amount, 500);
    }

    #[test]
    fn test_empty_cart_rejected() {
        let cart = cart_with(vec![]);
        assert_eq!(build_line_items(&cart), Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_totals_without_coupon() {
        let cart = cart_with(vec![(1, Decimal::new(2500, 2), 2)]);
        let totals = totals(&cart, None, Utc::now());
        assert_eq!(totals.subtotal, Decimal::new(5000, 2));
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::new(5000, 2));
        assert_eq!(totals.item_count, 2);
    }

    #[test]
    fn test_totals_with_coupon() {
        let cart = cart_with(vec![(1, Decimal::new(5000, 2), 2)]);
        let coupon = percent_coupon(10);
        let totals = totals(&cart, Some(&coupon), Utc::now());
        assert_eq!(totals.subtotal, Decimal::new(10000, 2));
        assert_eq!(totals.discount, Decimal::new(1000, 2));
        assert_eq!(totals.total, Decimal::new(9000, 2));
    }

    #[test]
    fn test_totals_with_invalid_coupon_previews_zero() {
        let cart = cart_with(vec![(1, Decimal::new(5000, 2), 1)]);
        let mut coupon = percent_coupon(10);
        coupon.is_active = false;
        let totals = totals(&cart, Some(&coupon), Utc::now());
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, totals.subtotal);
    }
}
