//! Wishlist repository.
//!
//! Same ownership model as carts: one active wishlist per registered user
//! or anonymous session token.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use golden_fig_core::{
    CategoryId, CurrencyCode, Price, ProductId, UserId, WishlistId, WishlistItemId,
};

use super::{RepositoryError, parse_column};
use crate::models::product::ProductSummary;
use crate::models::{Owner, Wishlist, WishlistItem};

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    id: i32,
    user_id: Option<i32>,
    session_token: Option<Uuid>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct WishlistItemRow {
    id: i32,
    product_id: i32,
    created_at: DateTime<Utc>,
    name: String,
    slug: String,
    price: Decimal,
    currency: String,
    category_id: Option<i32>,
    average_rating: Option<Decimal>,
    primary_image_url: Option<String>,
}

impl WishlistItemRow {
    fn into_item(self) -> Result<WishlistItem, RepositoryError> {
        let currency: CurrencyCode = parse_column(&self.currency, "currency")?;
        Ok(WishlistItem {
            id: WishlistItemId::new(self.id),
            product_id: ProductId::new(self.product_id),
            product: ProductSummary {
                id: ProductId::new(self.product_id),
                name: self.name,
                slug: self.slug,
                price: Price::new(self.price, currency),
                category_id: self.category_id.map(CategoryId::new),
                average_rating: self.average_rating,
                primary_image_url: self.primary_image_url,
            },
            added_at: self.created_at,
        })
    }
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the owner's wishlist, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, owner: Owner) -> Result<Wishlist, RepositoryError> {
        if let Some(wishlist) = self.find_active(owner).await? {
            return Ok(wishlist);
        }

        let insert = sqlx::query_as::<_, WishlistRow>(
            r"
            INSERT INTO shop.wishlists (user_id, session_token)
            VALUES ($1, $2)
            RETURNING id, user_id, session_token, created_at
            ",
        )
        .bind(owner.user_id().map(|id| id.as_i32()))
        .bind(owner.session_token())
        .fetch_one(self.pool)
        .await;

        match insert {
            Ok(row) => self.hydrate(row).await,
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

    /// Add a product to the owner's wishlist; adding a product that is
    /// already saved is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or
    /// archived.
    pub async fn add_item(
        &self,
        owner: Owner,
        product_id: ProductId,
    ) -> Result<Wishlist, RepositoryError> {
        let wishlist = self.get_or_create(owner).await?;

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
            INSERT INTO shop.wishlist_items (wishlist_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (wishlist_id, product_id) DO NOTHING
            ",
        )
        .bind(wishlist.id.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await?;

        self.get_or_create(owner).await
    }

    /// Remove an item from the owner's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item is not on the
    /// owner's wishlist.
    pub async fn remove_item(
        &self,
        owner: Owner,
        item_id: WishlistItemId,
    ) -> Result<Wishlist, RepositoryError> {
        let wishlist = self
            .find_active(owner)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let result = sqlx::query(
            "DELETE FROM shop.wishlist_items WHERE id = $1 AND wishlist_id = $2",
        )
        .bind(item_id.as_i32())
        .bind(wishlist.id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_or_create(owner).await
    }

    async fn find_active(&self, owner: Owner) -> Result<Option<Wishlist>, RepositoryError> {
        let row: Option<WishlistRow> = sqlx::query_as(
            r"
            SELECT id, user_id, session_token, created_at
            FROM shop.wishlists
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

    async fn hydrate(&self, row: WishlistRow) -> Result<Wishlist, RepositoryError> {
        let owner = match (row.user_id, row.session_token) {
            (Some(user_id), None) => Owner::User(UserId::new(user_id)),
            (None, Some(token)) => Owner::Guest(token),
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "wishlist {} has no single owner",
                    row.id
                )));
            }
        };

        let item_rows: Vec<WishlistItemRow> = sqlx::query_as(
            r"
            SELECT wi.id, wi.product_id, wi.created_at,
                   p.name, p.slug, p.price, p.currency, p.category_id,
                   r.average_rating,
                   img.url AS primary_image_url
            FROM shop.wishlist_items wi
            JOIN shop.products p ON p.id = wi.product_id
            LEFT JOIN (
                SELECT product_id, AVG(rating) AS average_rating
                FROM shop.reviews
                GROUP BY product_id
            ) r ON r.product_id = p.id
            LEFT JOIN LATERAL (
                SELECT url FROM shop.product_images
                WHERE product_id = p.id
                ORDER BY position ASC
                LIMIT 1
            ) img ON TRUE
            WHERE wi.wishlist_id = $1
            ORDER BY wi.created_at DESC, wi.id DESC
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let items = item_rows
            .into_iter()
            .map(WishlistItemRow::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Wishlist {
            id: WishlistId::new(row.id),
            owner,
            items,
            created_at: row.created_at,
        })
    }
}
