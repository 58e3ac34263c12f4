//! Order repository.
//!
//! `payment_intent_id` is unique and serves as the webhook idempotency
//! key: creating an order for an intent that already has one reports
//! `already_exists` instead of inserting a duplicate. Every status change
//! appends an order-history row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use golden_fig_core::{
    CouponId, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId,
};

use super::{RepositoryError, parse_column};
use crate::models::{NewOrder, Order, OrderHistoryEntry, OrderItem, Owner};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    session_token: Option<Uuid>,
    email: Option<String>,
    payment_intent_id: String,
    status: String,
    payment_status: String,
    subtotal: Decimal,
    discount_amount: Decimal,
    total: Decimal,
    currency: String,
    coupon_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let owner = match (self.user_id, self.session_token) {
            (Some(user_id), None) => Owner::User(UserId::new(user_id)),
            (None, Some(token)) => Owner::Guest(token),
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "order {} has no single owner",
                    self.id
                )));
            }
        };

        Ok(Order {
            id: OrderId::new(self.id),
            owner,
            email: self.email,
            payment_intent_id: self.payment_intent_id,
            status: parse_column(&self.status, "order status")?,
            payment_status: parse_column(&self.payment_status, "payment status")?,
            subtotal: self.subtotal,
            discount_amount: self.discount_amount,
            total: self.total,
            currency: parse_column(&self.currency, "currency")?,
            coupon_id: self.coupon_id.map(CouponId::new),
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    previous_status: Option<String>,
    new_status: String,
    previous_payment_status: Option<String>,
    new_payment_status: String,
    reason: String,
    created_at: DateTime<Utc>,
}

impl HistoryRow {
    fn into_entry(self) -> Result<OrderHistoryEntry, RepositoryError> {
        Ok(OrderHistoryEntry {
            previous_status: self
                .previous_status
                .as_deref()
                .map(|s| parse_column(s, "order status"))
                .transpose()?,
            new_status: parse_column(&self.new_status, "order status")?,
            previous_payment_status: self
                .previous_payment_status
                .as_deref()
                .map(|s| parse_column(s, "payment status"))
                .transpose()?,
            new_payment_status: parse_column(&self.new_payment_status, "payment status")?,
            reason: self.reason,
            created_at: self.created_at,
        })
    }
}

const ORDER_SELECT: &str = r"
    SELECT id, user_id, session_token, email, payment_intent_id, status,
           payment_status, subtotal, discount_amount, total, currency,
           coupon_id, created_at, updated_at
    FROM shop.orders
";

/// Result of [`OrderRepository::create`].
#[derive(Debug)]
pub struct CreatedOrder {
    pub order: Order,
    /// True when an order for the payment intent already existed and no
    /// new order was created (duplicate webhook delivery).
    pub already_exists: bool,
}

/// Result of a status transition, carrying the pre-transition statuses the
/// lifecycle service needs for the inventory pairing.
#[derive(Debug)]
pub struct StatusTransition {
    pub order: Order,
    pub previous_status: OrderStatus,
    pub previous_payment_status: PaymentStatus,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with its items and initial history entry.
    ///
    /// Idempotent on `payment_intent_id`: when an order for the intent
    /// already exists (checked up front, and again via the unique
    /// constraint to cover races) the existing order is returned with
    /// `already_exists: true`.
    ///
    /// When the order carries a coupon, its usage counter is incremented
    /// in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(&self, input: &NewOrder) -> Result<CreatedOrder, RepositoryError> {
        if let Some(existing) = self
            .find_by_payment_intent(&input.payment_intent_id)
            .await?
        {
            return Ok(CreatedOrder {
                order: existing,
                already_exists: true,
            });
        }

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, (i32,)>(
            r"
            INSERT INTO shop.orders
                (user_id, session_token, email, payment_intent_id, status,
                 payment_status, subtotal, discount_amount, total, currency, coupon_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            ",
        )
        .bind(input.owner.user_id().map(|id| id.as_i32()))
        .bind(input.owner.session_token())
        .bind(input.email.as_deref())
        .bind(&input.payment_intent_id)
        .bind(input.status.to_string())
        .bind(input.payment_status.to_string())
        .bind(input.subtotal)
        .bind(input.discount_amount)
        .bind(input.total)
        .bind(input.currency.to_string())
        .bind(input.coupon_id.map(|id| id.as_i32()))
        .fetch_one(&mut *tx)
        .await;

        let order_id = match inserted {
            Ok((id,)) => id,
            Err(e) => {
                // Duplicate delivery raced past the up-front check; the
                // first insert wins.
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    tx.rollback().await?;
                    let existing = self
                        .find_by_payment_intent(&input.payment_intent_id)
                        .await?
                        .ok_or(RepositoryError::NotFound)?;
                    return Ok(CreatedOrder {
                        order: existing,
                        already_exists: true,
                    });
                }
                return Err(RepositoryError::Database(e));
            }
        };

        for item in &input.items {
            sqlx::query(
                r"
                INSERT INTO shop.order_items
                    (order_id, product_id, product_name, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(item.product_id.as_i32())
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r"
            INSERT INTO shop.order_history
                (order_id, previous_status, new_status,
                 previous_payment_status, new_payment_status, reason)
            VALUES ($1, NULL, $2, NULL, $3, $4)
            ",
        )
        .bind(order_id)
        .bind(input.status.to_string())
        .bind(input.payment_status.to_string())
        .bind("order created")
        .execute(&mut *tx)
        .await?;

        if let Some(coupon_id) = input.coupon_id {
            sqlx::query(
                r"
                UPDATE shop.coupons
                SET usage_count = usage_count + 1, updated_at = NOW()
                WHERE id = $1
                ",
            )
            .bind(coupon_id.as_i32())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let order = self
            .get(OrderId::new(order_id))
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(CreatedOrder {
            order,
            already_exists: false,
        })
    }

    /// Find an order by its payment-provider intent id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let query = format!("{ORDER_SELECT} WHERE payment_intent_id = $1");
        let row: Option<OrderRow> = sqlx::query_as(&query)
            .bind(payment_intent_id)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.items_for(row.id).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    /// Get an order by id with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let query = format!("{ORDER_SELECT} WHERE id = $1");
        let row: Option<OrderRow> = sqlx::query_as(&query)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.items_for(row.id).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let query = format!(
            "{ORDER_SELECT} WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&query)
            .bind(user_id.as_i32())
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// List orders, optionally filtered by status, newest first (studio).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let query = format!(
            "{ORDER_SELECT} WHERE $1::text IS NULL OR status = $1
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&query)
            .bind(status.map(|s| s.to_string()))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// Update the order's status and/or payment status, appending a
    /// history row with the previous values and the reason.
    ///
    /// No adjacency check: any state can be set from any other. The
    /// lifecycle service layers the inventory pairing on top of the
    /// returned previous status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        new_status: Option<OrderStatus>,
        new_payment_status: Option<PaymentStatus>,
        reason: &str,
    ) -> Result<StatusTransition, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String, String)> = sqlx::query_as(
            "SELECT status, payment_status FROM shop.orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((status_str, payment_str)) = current else {
            return Err(RepositoryError::NotFound);
        };
        let previous_status: OrderStatus = parse_column(&status_str, "order status")?;
        let previous_payment_status: PaymentStatus =
            parse_column(&payment_str, "payment status")?;

        let next_status = new_status.unwrap_or(previous_status);
        let next_payment_status = new_payment_status.unwrap_or(previous_payment_status);

        sqlx::query(
            r"
            UPDATE shop.orders
            SET status = $2, payment_status = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(next_status.to_string())
        .bind(next_payment_status.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.order_history
                (order_id, previous_status, new_status,
                 previous_payment_status, new_payment_status, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(id.as_i32())
        .bind(previous_status.to_string())
        .bind(next_status.to_string())
        .bind(previous_payment_status.to_string())
        .bind(next_payment_status.to_string())
        .bind(reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let order = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        Ok(StatusTransition {
            order,
            previous_status,
            previous_payment_status,
        })
    }

    /// Append-only history for an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(&self, id: OrderId) -> Result<Vec<OrderHistoryEntry>, RepositoryError> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r"
            SELECT previous_status, new_status, previous_payment_status,
                   new_payment_status, reason, created_at
            FROM shop.order_history
            WHERE order_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(HistoryRow::into_entry).collect()
    }

    async fn items_for(&self, order_id: i32) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT id, order_id, product_id, product_name, unit_price, quantity
            FROM shop.order_items
            WHERE order_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT id, order_id, product_id, product_name, unit_price, quantity
            FROM shop.order_items
            WHERE order_id = ANY($1)
            ORDER BY id ASC
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: std::collections::HashMap<i32, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for item in item_rows {
            by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItem::from(item));
        }

        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}
