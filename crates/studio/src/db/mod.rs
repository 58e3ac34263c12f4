//! Database operations for studio-local tables.
//!
//! Commerce data is managed through `golden-fig-commerce`; this module
//! covers only the staff accounts the studio authenticates against.
//!
//! ## Tables
//!
//! - `studio.staff` - Staff accounts with argon2 password hashes
//! - `tower_sessions.session` - Session storage (shared table)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/studio/migrations/` and run via:
//! ```bash
//! cargo run -p golden-fig-cli -- migrate studio
//! ```

pub mod staff;

pub use golden_fig_commerce::db::{RepositoryError, create_pool};
pub use staff::StaffRepository;
