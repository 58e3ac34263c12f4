//! Order lifecycle service.
//!
//! Wraps the order repository with the two behaviors that span
//! aggregates:
//!
//! - creating an order from a cart (snapshot lines, apply the coupon,
//!   deactivate the cart, reserve stock when the order lands confirmed);
//! - status transitions, pairing the transition into `confirmed` with a
//!   stock reservation and the transition into `cancelled` (from a
//!   post-confirmation status) with the matching release.
//!
//! The status update and the stock walk are intentionally not one
//! cross-aggregate transaction: the status commits first, stock moves
//! second, and partial failure is logged and surfaced as warnings rather
//! than rolled back.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{instrument, warn};

use golden_fig_core::{OrderId, OrderStatus, PaymentStatus};

use crate::coupon;
use crate::db::orders::{CreatedOrder, StatusTransition};
use crate::db::{
    CartRepository, CouponRepository, InventoryRepository, OrderRepository, RepositoryError,
};
use crate::models::{Cart, NewOrder, NewOrderItem, Order};

/// Errors from the order lifecycle service.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("cart is empty")]
    EmptyCart,
}

/// Outcome of a lifecycle operation, carrying warnings for tolerated
/// partial failures of the stock walk.
#[derive(Debug)]
pub struct LifecycleOutcome {
    pub order: Order,
    /// True when this call created no new order (duplicate payment intent).
    pub already_exists: bool,
    /// One entry per order line whose stock walk failed.
    pub stock_warnings: Vec<String>,
}

/// Order lifecycle service over the shared pool.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order from a cart, idempotent on `payment_intent_id`.
    ///
    /// The attached coupon is revalidated here; a coupon that stopped
    /// being redeemable between attach and payment is dropped silently
    /// and the order proceeds undiscounted. On a fresh order the cart is
    /// deactivated and, when the order lands in a stock-holding status,
    /// stock is reserved per line.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` for a cart with no lines, or a
    /// wrapped `RepositoryError`.
    #[instrument(skip(self, cart), fields(cart_id = %cart.id))]
    pub async fn create_from_cart(
        &self,
        cart: &Cart,
        payment_intent_id: &str,
        email: Option<&str>,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> Result<LifecycleOutcome, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let subtotal = cart.subtotal();

        let coupon = match &cart.coupon_code {
            Some(code) => CouponRepository::new(self.pool).get_by_code(code).await?,
            None => None,
        };
        let (coupon_id, discount) = match coupon {
            Some(ref c) => match coupon::validate_and_discount(c, subtotal, Utc::now()) {
                Ok(discount) => (Some(c.id), discount),
                Err(reason) => {
                    warn!(code = %c.code, %reason, "dropping coupon no longer redeemable");
                    (None, Decimal::ZERO)
                }
            },
            None => (None, Decimal::ZERO),
        };

        let input = NewOrder {
            owner: cart.owner,
            email: email.map(str::to_owned),
            payment_intent_id: payment_intent_id.to_owned(),
            status,
            payment_status,
            subtotal,
            discount_amount: discount,
            total: (subtotal - discount).max(Decimal::ZERO),
            currency: cart.currency(),
            coupon_id,
            items: cart
                .items
                .iter()
                .map(|item| NewOrderItem {
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                })
                .collect(),
        };

        let CreatedOrder {
            order,
            already_exists,
        } = OrderRepository::new(self.pool).create(&input).await?;

        if already_exists {
            return Ok(LifecycleOutcome {
                order,
                already_exists,
                stock_warnings: Vec::new(),
            });
        }

        CartRepository::new(self.pool).deactivate(cart.id).await?;

        let stock_warnings = if status.holds_stock() {
            self.reserve_lines(&order).await
        } else {
            Vec::new()
        };

        Ok(LifecycleOutcome {
            order,
            already_exists,
            stock_warnings,
        })
    }

    /// Transition an order's status and/or payment status.
    ///
    /// The repository records the history row; this layers the inventory
    /// pairing on top: entering `confirmed` from a non-stock-holding
    /// status reserves stock per line, entering `cancelled` from a
    /// stock-holding status releases it. Cancelling a never-confirmed
    /// order touches no stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` (wrapped) if the order does not
    /// exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn transition(
        &self,
        id: OrderId,
        new_status: Option<OrderStatus>,
        new_payment_status: Option<PaymentStatus>,
        reason: &str,
    ) -> Result<LifecycleOutcome, OrderError> {
        let StatusTransition {
            order,
            previous_status,
            ..
        } = OrderRepository::new(self.pool)
            .update_status(id, new_status, new_payment_status, reason)
            .await?;

        let stock_warnings = match (previous_status, order.status) {
            (prev, OrderStatus::Confirmed) if !prev.holds_stock() => {
                self.reserve_lines(&order).await
            }
            (prev, OrderStatus::Cancelled) if prev.holds_stock() => {
                self.release_lines(&order).await
            }
            _ => Vec::new(),
        };

        Ok(LifecycleOutcome {
            order,
            already_exists: false,
            stock_warnings,
        })
    }

    async fn reserve_lines(&self, order: &Order) -> Vec<String> {
        let inventory = InventoryRepository::new(self.pool);
        let mut warnings = Vec::new();
        for item in &order.items {
            if let Err(e) = inventory.reserve(item.product_id, item.quantity).await {
                warn!(
                    order_id = %order.id,
                    product_id = %item.product_id,
                    error = %e,
                    "stock reservation failed"
                );
                warnings.push(format!(
                    "reservation failed for product {}: {e}",
                    item.product_id
                ));
            }
        }
        warnings
    }

    async fn release_lines(&self, order: &Order) -> Vec<String> {
        let inventory = InventoryRepository::new(self.pool);
        let mut warnings = Vec::new();
        for item in &order.items {
            if let Err(e) = inventory.release(item.product_id, item.quantity).await {
                warn!(
                    order_id = %order.id,
                    product_id = %item.product_id,
                    error = %e,
                    "stock release failed"
                );
                warnings.push(format!(
                    "release failed for product {}: {e}",
                    item.product_id
                ));
            }
        }
        warnings
    }
}
