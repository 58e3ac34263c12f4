//! Inventory repository: stock on hand, reservation, and release.
//!
//! Reservation is a guarded decrement (`WHERE quantity_on_hand >= $qty`),
//! not a serializable reservation engine. The order lifecycle pairs
//! reserve/release with confirmation and cancellation; see
//! [`crate::orders`].

use sqlx::PgPool;

use golden_fig_core::ProductId;

use super::RepositoryError;

/// Repository for stock levels.
pub struct InventoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InventoryRepository<'a> {
    /// Create a new inventory repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Stock on hand for a product. `None` when inventory is not tracked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn quantity_on_hand(
        &self,
        product_id: ProductId,
    ) -> Result<Option<i32>, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT quantity_on_hand FROM shop.inventory WHERE product_id = $1",
        )
        .bind(product_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(qty,)| qty))
    }

    /// Set the absolute stock level (studio).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn set(&self, product_id: ProductId, quantity: i32) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.inventory (product_id, quantity_on_hand)
            VALUES ($1, $2)
            ON CONFLICT (product_id)
            DO UPDATE SET quantity_on_hand = EXCLUDED.quantity_on_hand, updated_at = NOW()
            ",
        )
        .bind(product_id.as_i32())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Adjust stock by a signed delta (studio receiving/correction).
    ///
    /// The result is floored at zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if inventory is not tracked for
    /// the product.
    pub async fn adjust(&self, product_id: ProductId, delta: i32) -> Result<i32, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"
            UPDATE shop.inventory
            SET quantity_on_hand = GREATEST(quantity_on_hand + $2, 0), updated_at = NOW()
            WHERE product_id = $1
            RETURNING quantity_on_hand
            ",
        )
        .bind(product_id.as_i32())
        .bind(delta)
        .fetch_optional(self.pool)
        .await?;

        row.map(|(qty,)| qty).ok_or(RepositoryError::NotFound)
    }

    /// Reserve stock for an order line: decrement on hand, failing when the
    /// product has less stock than requested.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InsufficientStock` when on hand < `quantity`
    /// or the product is not tracked.
    pub async fn reserve(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.inventory
            SET quantity_on_hand = quantity_on_hand - $2, updated_at = NOW()
            WHERE product_id = $1 AND quantity_on_hand >= $2
            ",
        )
        .bind(product_id.as_i32())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::InsufficientStock {
                product_id,
                requested: quantity,
            });
        }
        Ok(())
    }

    /// Release previously reserved stock: increment on hand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if inventory is not tracked for
    /// the product.
    pub async fn release(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.inventory
            SET quantity_on_hand = quantity_on_hand + $2, updated_at = NOW()
            WHERE product_id = $1
            ",
        )
        .bind(product_id.as_i32())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
