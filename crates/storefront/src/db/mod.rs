//! Database operations for storefront-local tables.
//!
//! The commerce data (catalog, carts, orders, coupons, wishlists) lives in
//! the `shop` schema and is accessed through `golden-fig-commerce`. This
//! module covers only what is storefront-local:
//!
//! ## Tables
//!
//! - `storefront.users` - Shopper accounts
//! - `storefront.user_passwords` - Argon2 password hashes
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p golden-fig-cli -- migrate storefront
//! ```

pub mod users;

pub use golden_fig_commerce::db::{RepositoryError, create_pool};
pub use users::UserRepository;
