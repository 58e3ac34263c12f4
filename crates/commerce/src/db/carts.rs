//! Cart repository.
//!
//! A cart belongs to a registered user or an anonymous session token,
//! never both; partial unique indexes guarantee at most one active cart
//! per owner. Lines join the catalog for current name, price, and image -
//! prices are only snapshotted when the cart becomes an order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use golden_fig_core::{CartId, CartItemId, CurrencyCode, ProductId, UserId};

use super::{RepositoryError, parse_column};
use crate::models::{Cart, CartItem, Owner};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: Option<i32>,
    session_token: Option<Uuid>,
    coupon_code: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CartRow {
    fn owner(&self) -> Result<Owner, RepositoryError> {
        match (self.user_id, self.session_token) {
            (Some(user_id), None) => Ok(Owner::User(UserId::new(user_id))),
            (None, Some(token)) => Ok(Owner::Guest(token)),
            _ => Err(RepositoryError::DataCorruption(format!(
                "cart {} has no single owner",
                self.id
            ))),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    product_id: i32,
    product_name: String,
    product_slug: String,
    unit_price: Decimal,
    currency: String,
    quantity: i32,
    image_url: Option<String>,
}

impl CartItemRow {
    fn into_item(self) -> Result<CartItem, RepositoryError> {
        let currency: CurrencyCode = parse_column(&self.currency, "currency")?;
        Ok(CartItem {
            id: CartItemId::new(self.id),
            product_id: ProductId::new(self.product_id),
            product_name: self.product_name,
            product_slug: self.product_slug,
            unit_price: self.unit_price,
            currency,
            quantity: self.quantity,
            image_url: self.image_url,
        })
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the owner's active cart, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_active(&self, owner: Owner) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(
            r"
            SELECT id, user_id, session_token, coupon_code, is_active, created_at, updated_at
            FROM shop.carts
            WHERE is_active
              AND ($1::int IS NOT NULL AND user_id = $1
                   OR $2::uuid IS NOT NULL AND session_token = $2)
            ",
        )
        .bind(owner.user_id().map(|id| id.as_i32()))
        .bind(owner.session_token())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Find the owner's active cart, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, owner: Owner) -> Result<Cart, RepositoryError> {
        if let Some(cart) = self.find_active(owner).await? {
            return Ok(cart);
        }

        let insert = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO shop.carts (user_id, session_token)
            VALUES ($1, $2)
            RETURNING id, user_id, session_token, coupon_code, is_active, created_at, updated_at
            ",
        )
        .bind(owner.user_id().map(|id| id.as_i32()))
        .bind(owner.session_token())
        .fetch_one(self.pool)
        .await;

        match insert {
            Ok(row) => self.hydrate(row).await,
            // Lost a create race: the partial unique index fired, the other
            // cart wins.
            Err(e) => {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return self
                        .find_active(owner)
                        .await?
                        .ok_or(RepositoryError::NotFound);
                }
                Err(RepositoryError::Database(e))
            }
        }
    }

    /// Get a cart by id regardless of owner or active flag.
    ///
    /// Used by the webhook handler, which knows the cart only by the id
    /// carried in the checkout-session metadata.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(
            r"
            SELECT id, user_id, session_token, coupon_code, is_active, created_at, updated_at
            FROM shop.carts
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Add a product to the owner's cart; an existing line for the product
    /// gets its quantity incremented.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or
    /// archived.
    pub async fn add_item(
        &self,
        owner: Owner,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart, RepositoryError> {
        let quantity = quantity.max(1);
        let cart = self.get_or_create(owner).await?;

        let product_exists: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM shop.products WHERE id = $1 AND is_active")
                .bind(product_id.as_i32())
                .fetch_optional(self.pool)
                .await?;
        if product_exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r"
            INSERT INTO shop.cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = shop.cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            ",
        )
        .bind(cart.id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        self.touch(cart.id).await?;
        self.get_by_id(cart.id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// Mutating a line outside the owner's active cart is a no-op reported
    /// as `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the owner's
    /// active cart.
    pub async fn update_item(
        &self,
        owner: Owner,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<Cart, RepositoryError> {
        let cart = self
            .find_active(owner)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let result = if quantity <= 0 {
            sqlx::query("DELETE FROM shop.cart_items WHERE id = $1 AND cart_id = $2")
                .bind(item_id.as_i32())
                .bind(cart.id.as_i32())
                .execute(self.pool)
                .await?
        } else {
            sqlx::query(
                r"
                UPDATE shop.cart_items
                SET quantity = $3, updated_at = NOW()
                WHERE id = $1 AND cart_id = $2
                ",
            )
            .bind(item_id.as_i32())
            .bind(cart.id.as_i32())
            .bind(quantity)
            .execute(self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.touch(cart.id).await?;
        self.get_by_id(cart.id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Remove a line from the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the owner's
    /// active cart.
    pub async fn remove_item(
        &self,
        owner: Owner,
        item_id: CartItemId,
    ) -> Result<Cart, RepositoryError> {
        self.update_item(owner, item_id, 0).await
    }

    /// Remove every line from the owner's active cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no active cart.
    pub async fn clear(&self, owner: Owner) -> Result<Cart, RepositoryError> {
        let cart = self
            .find_active(owner)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM shop.cart_items WHERE cart_id = $1")
            .bind(cart.id.as_i32())
            .execute(self.pool)
            .await?;

        self.touch(cart.id).await?;
        self.get_by_id(cart.id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Attach a coupon code to the cart (`None` detaches).
    ///
    /// Business validation happens in [`crate::coupon`]; this only stores
    /// the code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart does not exist.
    pub async fn set_coupon_code(
        &self,
        cart_id: CartId,
        code: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.carts SET coupon_code = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(cart_id.as_i32())
        .bind(code)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Deactivate a cart (after checkout created an order from it).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn deactivate(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE shop.carts SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(cart_id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Merge a guest cart into a user's cart on login.
    ///
    /// Line quantities are added; the guest cart is deactivated. A missing
    /// guest cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn merge_guest_into_user(
        &self,
        session_token: Uuid,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let Some(guest) = self.find_active(Owner::Guest(session_token)).await? else {
            return Ok(());
        };
        if guest.is_empty() {
            self.deactivate(guest.id).await?;
            return Ok(());
        }

        let user_cart = self.get_or_create(Owner::User(user_id)).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO shop.cart_items (cart_id, product_id, quantity)
            SELECT $2, product_id, quantity FROM shop.cart_items WHERE cart_id = $1
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = shop.cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            ",
        )
        .bind(guest.id.as_i32())
        .bind(user_cart.id.as_i32())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE shop.carts SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(guest.id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn touch(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE shop.carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn hydrate(&self, row: CartRow) -> Result<Cart, RepositoryError> {
        let owner = row.owner()?;

        let item_rows: Vec<CartItemRow> = sqlx::query_as(
            r"
            SELECT ci.id, ci.product_id, p.name AS product_name, p.slug AS product_slug,
                   p.price AS unit_price, p.currency, ci.quantity,
                   img.url AS image_url
            FROM shop.cart_items ci
            JOIN shop.products p ON p.id = ci.product_id
            LEFT JOIN LATERAL (
                SELECT url FROM shop.product_images
                WHERE product_id = p.id
                ORDER BY position ASC
                LIMIT 1
            ) img ON TRUE
            WHERE ci.cart_id = $1
            ORDER BY ci.created_at ASC, ci.id ASC
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let items = item_rows
            .into_iter()
            .map(CartItemRow::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cart {
            id: CartId::new(row.id),
            owner,
            coupon_code: row.coupon_code,
            items,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
