//! Staff repository.
//!
//! Staff accounts are created via the CLI, not self-service.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use golden_fig_core::{Email, StaffId};

use super::RepositoryError;
use crate::models::staff::Staff;

#[derive(Debug, sqlx::FromRow)]
struct StaffRow {
    id: i32,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl StaffRow {
    fn into_staff(self) -> Result<Staff, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Staff {
            id: StaffId::new(self.id),
            email,
            name: self.name,
            created_at: self.created_at,
        })
    }
}

/// Repository for staff database operations.
pub struct StaffRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StaffRepository<'a> {
    /// Create a new staff repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a staff member by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StaffId) -> Result<Option<Staff>, RepositoryError> {
        let row: Option<StaffRow> = sqlx::query_as(
            "SELECT id, email, name, created_at FROM studio.staff WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(StaffRow::into_staff).transpose()
    }

    /// Create a staff member with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
    ) -> Result<Staff, RepositoryError> {
        let row: StaffRow = sqlx::query_as(
            r"
            INSERT INTO studio.staff (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, created_at
            ",
        )
        .bind(email.as_str())
        .bind(name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("staff email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_staff()
    }

    /// Get a staff member and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Staff, String)>, RepositoryError> {
        #[derive(Debug, sqlx::FromRow)]
        struct PasswordRow {
            id: i32,
            email: String,
            name: String,
            created_at: DateTime<Utc>,
            password_hash: String,
        }

        let row: Option<PasswordRow> = sqlx::query_as(
            r"
            SELECT id, email, name, created_at, password_hash
            FROM studio.staff
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let staff = StaffRow {
            id: row.id,
            email: row.email,
            name: row.name,
            created_at: row.created_at,
        }
        .into_staff()?;

        Ok(Some((staff, row.password_hash)))
    }
}
