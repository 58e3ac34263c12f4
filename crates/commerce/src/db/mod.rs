//! Database operations for the `shop` schema.
//!
//! # Tables
//!
//! - `shop.categories`, `shop.products`, `shop.product_images` - Catalog
//! - `shop.inventory` - Stock on hand, one row per product
//! - `shop.reviews` - Shopper reviews
//! - `shop.carts`, `shop.cart_items` - Active carts (user- or session-owned)
//! - `shop.coupons` - Discount rules with usage counters
//! - `shop.orders`, `shop.order_items`, `shop.order_history` - Orders
//! - `shop.wishlists`, `shop.wishlist_items` - Wishlists
//!
//! All queries are runtime-checked; row structs derive `FromRow` and are
//! converted into the domain models in [`crate::models`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/commerce/migrations/` and run via:
//! ```bash
//! cargo run -p golden-fig-cli -- migrate commerce
//! ```

pub mod carts;
pub mod coupons;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod wishlists;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use coupons::CouponRepository;
pub use inventory::InventoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use wishlists::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug or payment intent).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Stock on hand is below the requested reservation.
    #[error("insufficient stock for product {product_id}: requested {requested}")]
    InsufficientStock {
        product_id: golden_fig_core::ProductId,
        requested: i32,
    },
}

impl RepositoryError {
    /// Map a sqlx error, converting unique violations to `Conflict`.
    pub(crate) fn from_sqlx(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a TEXT status column, surfacing bad values as data corruption.
pub(crate) fn parse_column<T>(value: &str, column: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {column} in database: {e}"))
    })
}
