//! Catalog repository: products, categories, images, and reviews.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use golden_fig_core::{
    CategoryId, CurrencyCode, Price, ProductId, ProductImageId, ReviewId, UserId,
};

use super::{RepositoryError, parse_column};
use crate::models::product::{
    CategoryRef, NewProduct, Product, ProductFilter, ProductImage, ProductSummary, Review,
    UpdateProduct,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    currency: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_id: Option<i32>,
    category_name: Option<String>,
    category_slug: Option<String>,
    quantity_on_hand: Option<i32>,
    average_rating: Option<Decimal>,
    review_count: i64,
}

impl ProductRow {
    fn into_product(self, images: Vec<ProductImage>) -> Result<Product, RepositoryError> {
        let currency: CurrencyCode = parse_column(&self.currency, "currency")?;
        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef {
                id: CategoryId::new(id),
                name,
                slug,
            }),
            _ => None,
        };

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            slug: self.slug,
            description: self.description,
            price: Price::new(self.price, currency),
            category,
            images,
            quantity_on_hand: self.quantity_on_hand,
            average_rating: self.average_rating,
            review_count: self.review_count,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i32,
    name: String,
    slug: String,
    price: Decimal,
    currency: String,
    category_id: Option<i32>,
    average_rating: Option<Decimal>,
    primary_image_url: Option<String>,
}

impl SummaryRow {
    fn into_summary(self) -> Result<ProductSummary, RepositoryError> {
        let currency: CurrencyCode = parse_column(&self.currency, "currency")?;
        Ok(ProductSummary {
            id: ProductId::new(self.id),
            name: self.name,
            slug: self.slug,
            price: Price::new(self.price, currency),
            category_id: self.category_id.map(CategoryId::new),
            average_rating: self.average_rating,
            primary_image_url: self.primary_image_url,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: i32,
    url: String,
    alt_text: Option<String>,
    position: i32,
}

impl From<ImageRow> for ProductImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            url: row.url,
            alt_text: row.alt_text,
            position: row.position,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    rating: i32,
    body: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            rating: row.rating,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

/// Shared SELECT for full product rows.
const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.slug, p.description, p.price, p.currency, p.is_active,
           p.created_at, p.updated_at,
           c.id AS category_id, c.name AS category_name, c.slug AS category_slug,
           i.quantity_on_hand,
           r.average_rating, COALESCE(r.review_count, 0) AS review_count
    FROM shop.products p
    LEFT JOIN shop.categories c ON c.id = p.category_id
    LEFT JOIN shop.inventory i ON i.product_id = p.id
    LEFT JOIN (
        SELECT product_id, AVG(rating) AS average_rating, COUNT(*) AS review_count
        FROM shop.reviews
        GROUP BY product_id
    ) r ON r.product_id = p.id
";

/// Shared SELECT for summary rows.
const SUMMARY_SELECT: &str = r"
    SELECT p.id, p.name, p.slug, p.price, p.currency, p.category_id,
           r.average_rating,
           img.url AS primary_image_url
    FROM shop.products p
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
";

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let query = format!(
            r"{SUMMARY_SELECT}
            WHERE p.is_active
              AND ($1::text IS NULL
                   OR p.category_id IN (SELECT id FROM shop.categories WHERE slug = $1))
              AND ($2::numeric IS NULL OR p.price >= $2)
              AND ($3::numeric IS NULL OR p.price <= $3)
              AND ($4::text IS NULL OR p.name ILIKE '%' || $4 || '%')
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $5 OFFSET $6
            "
        );

        let rows: Vec<SummaryRow> = sqlx::query_as(&query)
            .bind(filter.category.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.search.as_deref())
            .bind(filter.effective_limit())
            .bind(filter.effective_offset())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(SummaryRow::into_summary).collect()
    }

    /// List products matching the filter regardless of active flag
    /// (studio listings include archived products).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let query = format!(
            r"{SUMMARY_SELECT}
            WHERE ($1::text IS NULL
                   OR p.category_id IN (SELECT id FROM shop.categories WHERE slug = $1))
              AND ($2::numeric IS NULL OR p.price >= $2)
              AND ($3::numeric IS NULL OR p.price <= $3)
              AND ($4::text IS NULL OR p.name ILIKE '%' || $4 || '%')
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $5 OFFSET $6
            "
        );

        let rows: Vec<SummaryRow> = sqlx::query_as(&query)
            .bind(filter.category.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.search.as_deref())
            .bind(filter.effective_limit())
            .bind(filter.effective_offset())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(SummaryRow::into_summary).collect()
    }

    /// Get a product by id, including images, stock, and review aggregate.
    ///
    /// Archived products are still resolvable here; listings filter them out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let query = format!("{PRODUCT_SELECT} WHERE p.id = $1");
        let row: Option<ProductRow> = sqlx::query_as(&query)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => {
                let images = self.images(ProductId::new(row.id)).await?;
                Ok(Some(row.into_product(images)?))
            }
            None => Ok(None),
        }
    }

    /// Get a product by slug, including images, stock, and review aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let query = format!("{PRODUCT_SELECT} WHERE p.slug = $1");
        let row: Option<ProductRow> = sqlx::query_as(&query)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => {
                let images = self.images(ProductId::new(row.id)).await?;
                Ok(Some(row.into_product(images)?))
            }
            None => Ok(None),
        }
    }

    async fn images(&self, product_id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows: Vec<ImageRow> = sqlx::query_as(
            r"
            SELECT id, url, alt_text, position
            FROM shop.product_images
            WHERE product_id = $1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductImage::from).collect())
    }

    // =========================================================================
    // Recommendation candidate queries
    // =========================================================================

    /// Active products sharing a category with the seed, seed excluded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn in_category(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let query = format!(
            r"{SUMMARY_SELECT}
            WHERE p.is_active AND p.category_id = $1 AND p.id <> $2
            ORDER BY p.id ASC
            LIMIT $3
            "
        );
        let rows: Vec<SummaryRow> = sqlx::query_as(&query)
            .bind(category_id.as_i32())
            .bind(exclude.as_i32())
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(SummaryRow::into_summary).collect()
    }

    /// Active products priced inside `[min, max]`, seed excluded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn in_price_band(
        &self,
        min: Decimal,
        max: Decimal,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let query = format!(
            r"{SUMMARY_SELECT}
            WHERE p.is_active AND p.price BETWEEN $1 AND $2 AND p.id <> $3
            ORDER BY p.id ASC
            LIMIT $4
            "
        );
        let rows: Vec<SummaryRow> = sqlx::query_as(&query)
            .bind(min)
            .bind(max)
            .bind(exclude.as_i32())
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(SummaryRow::into_summary).collect()
    }

    /// Active products with an average rating at or above `min_rating`,
    /// seed excluded, best-rated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_rated(
        &self,
        min_rating: Decimal,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let query = format!(
            r"{SUMMARY_SELECT}
            WHERE p.is_active AND p.id <> $2 AND r.average_rating >= $1
            ORDER BY r.average_rating DESC, p.id ASC
            LIMIT $3
            "
        );
        let rows: Vec<SummaryRow> = sqlx::query_as(&query)
            .bind(min_rating)
            .bind(exclude.as_i32())
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(SummaryRow::into_summary).collect()
    }

    // =========================================================================
    // Studio mutations
    // =========================================================================

    /// Create a product together with its inventory row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: (i32,) = sqlx::query_as(
            r"
            INSERT INTO shop.products (name, slug, description, price, currency, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.price)
        .bind(CurrencyCode::default().to_string())
        .bind(input.category_id.map(|id| id.as_i32()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "product slug already exists"))?;

        sqlx::query(
            r"
            INSERT INTO shop.inventory (product_id, quantity_on_hand)
            VALUES ($1, $2)
            ",
        )
        .bind(row.0)
        .bind(input.quantity_on_hand.unwrap_or(0))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(ProductId::new(row.0))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Update a product. `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &UpdateProduct,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                category_id = CASE WHEN $5 THEN $6 ELSE category_id END,
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.category_id.is_some())
        .bind(input.category_id.flatten().map(|id| id.as_i32()))
        .bind(input.is_active)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Archive a product (hide from listings; existing orders keep it).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn archive(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.products SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Attach an image to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        url: &str,
        alt_text: Option<&str>,
        position: i32,
    ) -> Result<ProductImage, RepositoryError> {
        let row: ImageRow = sqlx::query_as(
            r"
            INSERT INTO shop.product_images (product_id, url, alt_text, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, url, alt_text, position
            ",
        )
        .bind(product_id.as_i32())
        .bind(url)
        .bind(alt_text)
        .bind(position)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Remove an image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image does not exist.
    pub async fn remove_image(&self, image_id: ProductImageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product_images WHERE id = $1")
            .bind(image_id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// List reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r"
            SELECT id, product_id, user_id, rating, body, created_at
            FROM shop.reviews
            WHERE product_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Create a review. One review per shopper per product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the shopper already reviewed
    /// the product.
    pub async fn create_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i32,
        body: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let row: ReviewRow = sqlx::query_as(
            r"
            INSERT INTO shop.reviews (product_id, user_id, rating, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, user_id, rating, body, created_at
            ",
        )
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .bind(rating)
        .bind(body)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "product already reviewed"))?;

        Ok(row.into())
    }
}
