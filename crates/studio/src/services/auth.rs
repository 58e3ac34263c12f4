//! Staff authentication service.
//!
//! Login verification for the studio, plus the password hashing the CLI
//! uses when creating staff accounts.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use golden_fig_core::Email;

use crate::db::{RepositoryError, StaffRepository};
use crate::models::staff::Staff;

/// Minimum password length for staff accounts.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Errors that can occur during staff authentication.
#[derive(Debug, Error)]
pub enum StaffAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] golden_fig_core::EmailError),

    /// Invalid credentials (wrong password or staff not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Staff authentication service.
pub struct StaffAuthService<'a> {
    staff: StaffRepository<'a>,
}

impl<'a> StaffAuthService<'a> {
    /// Create a new staff authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            staff: StaffRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `StaffAuthError::InvalidCredentials` if the email/password
    /// is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Staff, StaffAuthError> {
        let email = Email::parse(email)?;

        let (staff, password_hash) = self
            .staff
            .get_password_hash(&email)
            .await?
            .ok_or(StaffAuthError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&password_hash).map_err(|_| StaffAuthError::PasswordHash)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| StaffAuthError::InvalidCredentials)?;

        Ok(staff)
    }

    /// Create a staff account (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `StaffAuthError::WeakPassword` for short passwords, or a
    /// wrapped repository error (`Conflict` for duplicate emails).
    pub async fn create_staff(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Staff, StaffAuthError> {
        let email = Email::parse(email)?;

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(StaffAuthError::WeakPassword(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = hash_password(password)?;
        let staff = self.staff.create(&email, name, &password_hash).await?;
        Ok(staff)
    }
}

/// Hash a password with argon2 and a random salt.
fn hash_password(password: &str) -> Result<String, StaffAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| StaffAuthError::PasswordHash)?;
    Ok(hash.to_string())
}
