//! Cart models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use golden_fig_core::{CartId, CartItemId, CurrencyCode, ProductId};

use super::Owner;

/// An active cart with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    #[serde(skip)]
    pub owner: Owner,
    /// Coupon code attached to the cart, validated again at checkout.
    pub coupon_code: Option<String>,
    pub items: Vec<CartItem>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of the cart, taken from the first line.
    ///
    /// The catalog is single-currency, so every line agrees.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.items
            .first()
            .map_or_else(CurrencyCode::default, |item| item.currency)
    }
}

/// A cart line item, one per product.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub unit_price: Decimal,
    pub currency: CurrencyCode,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl CartItem {
    /// Line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Computed cart totals, including the coupon discount preview.
#[derive(Debug, Clone, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    /// Discount from the attached coupon; zero when none applies.
    pub discount: Decimal,
    pub total: Decimal,
    pub item_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: i32, price: Decimal, quantity: i32) -> CartItem {
        CartItem {
            id: CartItemId::new(product),
            product_id: ProductId::new(product),
            product_name: format!("Product {product}"),
            product_slug: format!("product-{product}"),
            unit_price: price,
            currency: CurrencyCode::USD,
            quantity,
            image_url: None,
        }
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart {
            id: CartId::new(1),
            owner: Owner::User(golden_fig_core::UserId::new(1)),
            coupon_code: None,
            items,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let cart = cart(vec![
            item(1, Decimal::new(1050, 2), 2),
            item(2, Decimal::new(399, 2), 1),
        ]);
        assert_eq!(cart.subtotal(), Decimal::new(2499, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_cart() {
        let cart = cart(vec![]);
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }
}
