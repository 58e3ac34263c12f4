//! Staff account management.

use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use thiserror::Error;

use golden_fig_studio::services::auth::StaffAuthService;

/// Length of generated staff passwords.
const GENERATED_PASSWORD_LENGTH: usize = 24;

/// Errors creating staff accounts.
#[derive(Debug, Error)]
pub enum StaffError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Auth error: {0}")]
    Auth(#[from] golden_fig_studio::services::auth::StaffAuthError),
}

/// Create a staff account with a generated password.
///
/// The password is printed once; it cannot be recovered later.
///
/// # Errors
///
/// Returns `StaffError` if the database is unreachable or the email is
/// already taken.
pub async fn create(email: &str, name: &str) -> Result<(), StaffError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STUDIO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| StaffError::MissingEnvVar("STUDIO_DATABASE_URL"))?;

    let pool = PgPool::connect(&database_url).await?;

    let password: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect();

    let staff = StaffAuthService::new(&pool)
        .create_staff(email, name, &password)
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Created staff account {} ({})", staff.email, staff.id);
        println!("Generated password (shown once): {password}");
    }

    Ok(())
}
