//! Wishlist models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use golden_fig_core::{ProductId, WishlistId, WishlistItemId};

use super::Owner;
use super::product::ProductSummary;

/// A shopper's wishlist.
#[derive(Debug, Clone, Serialize)]
pub struct Wishlist {
    pub id: WishlistId,
    #[serde(skip)]
    pub owner: Owner,
    pub items: Vec<WishlistItem>,
    pub created_at: DateTime<Utc>,
}

/// A saved product on a wishlist.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product: ProductSummary,
    pub added_at: DateTime<Utc>,
}
