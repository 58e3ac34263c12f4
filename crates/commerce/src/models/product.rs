//! Catalog models: products, images, and reviews.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use golden_fig_core::{CategoryId, Price, ProductId, ProductImageId, ReviewId, UserId};

/// A catalog product with its display data.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Price,
    pub category: Option<CategoryRef>,
    pub images: Vec<ProductImage>,
    /// Stock on hand; `None` when inventory is not tracked for the product.
    pub quantity_on_hand: Option<i32>,
    /// Average review rating, when the product has reviews.
    pub average_rating: Option<Decimal>,
    pub review_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category reference embedded in product payloads.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Lightweight product row for listings and recommendations.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    pub average_rating: Option<Decimal>,
    pub primary_image_url: Option<String>,
}

/// A product image, ordered by `position`.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub url: String,
    pub alt_text: Option<String>,
    pub position: i32,
}

/// A shopper review.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// 1 through 5, validated at creation.
    pub rating: i32,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Restrict to a category by slug.
    pub category: Option<String>,
    /// Minimum price, inclusive.
    pub min_price: Option<Decimal>,
    /// Maximum price, inclusive.
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductFilter {
    /// Default page size for catalog listings.
    pub const DEFAULT_LIMIT: i64 = 24;
    /// Upper bound on requested page size.
    pub const MAX_LIMIT: i64 = 100;

    /// Effective limit, clamped to `MAX_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// Effective offset, floored at zero.
    #[must_use]
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Input for creating a product (studio).
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<CategoryId>,
    /// Initial stock on hand.
    pub quantity_on_hand: Option<i32>,
}

/// Input for updating a product (studio). `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<Option<CategoryId>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit_clamps() {
        let filter = ProductFilter {
            limit: Some(10_000),
            ..ProductFilter::default()
        };
        assert_eq!(filter.effective_limit(), ProductFilter::MAX_LIMIT);

        let filter = ProductFilter {
            limit: Some(0),
            ..ProductFilter::default()
        };
        assert_eq!(filter.effective_limit(), 1);

        let filter = ProductFilter::default();
        assert_eq!(filter.effective_limit(), ProductFilter::DEFAULT_LIMIT);
    }

    #[test]
    fn test_effective_offset_floors() {
        let filter = ProductFilter {
            offset: Some(-5),
            ..ProductFilter::default()
        };
        assert_eq!(filter.effective_offset(), 0);
    }
}
