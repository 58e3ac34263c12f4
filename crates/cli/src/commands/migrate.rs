//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - database holding the `shop` and
//!   `storefront` schemas (commerce + storefront targets)
//! - `STUDIO_DATABASE_URL` - database holding the `studio` schema
//!   (usually the same database)
//!
//! Both fall back to `DATABASE_URL`.
//!
//! # Migration Files
//!
//! - Commerce: `crates/commerce/migrations/`
//! - Storefront: `crates/storefront/migrations/`
//! - Studio: `crates/studio/migrations/`

use sqlx::PgPool;
use thiserror::Error;

/// Errors running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run commerce (shop schema) migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a
/// migration fails.
pub async fn commerce() -> Result<(), MigrationError> {
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Running commerce migrations...");
    sqlx::migrate!("../commerce/migrations").run(&pool).await?;

    tracing::info!("Commerce migrations complete");
    Ok(())
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a
/// migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}

/// Run studio database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a
/// migration fails.
pub async fn studio() -> Result<(), MigrationError> {
    let pool = connect("STUDIO_DATABASE_URL").await?;

    tracing::info!("Running studio migrations...");
    sqlx::migrate!("../studio/migrations").run(&pool).await?;

    tracing::info!("Studio migrations complete");
    Ok(())
}

async fn connect(primary_key: &'static str) -> Result<PgPool, MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar(primary_key))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(&database_url).await?)
}
