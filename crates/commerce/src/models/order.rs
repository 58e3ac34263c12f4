//! Order models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use golden_fig_core::{
    CouponId, CurrencyCode, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId,
};

use super::Owner;

/// An order with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(skip)]
    pub owner: Owner,
    /// Contact email captured at checkout.
    pub email: Option<String>,
    /// Payment-provider intent id; unique, the webhook idempotency key.
    pub payment_intent_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub coupon_id: Option<CouponId>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line item: a snapshot of the product at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    /// Product name at purchase time; later renames don't rewrite history.
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    /// Line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Append-only audit entry for a status or payment-status change.
#[derive(Debug, Clone, Serialize)]
pub struct OrderHistoryEntry {
    pub previous_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub previous_payment_status: Option<PaymentStatus>,
    pub new_payment_status: PaymentStatus,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an order from a cart.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner: Owner,
    pub email: Option<String>,
    pub payment_intent_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub coupon_id: Option<CouponId>,
    pub items: Vec<NewOrderItem>,
}

/// Line-item input for [`NewOrder`].
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}
