//! Coupon repository.
//!
//! Codes are stored uppercase and looked up case-insensitively. Usage
//! increments happen inside the order-creation transaction; see
//! [`super::orders::OrderRepository::create`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use golden_fig_core::{CouponId, CouponKind};

use super::{RepositoryError, parse_column};
use crate::models::{Coupon, NewCoupon, UpdateCoupon};

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: i32,
    code: String,
    kind: String,
    value: Decimal,
    min_order_amount: Option<Decimal>,
    max_discount: Option<Decimal>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    usage_limit: Option<i32>,
    usage_count: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CouponRow {
    fn into_coupon(self) -> Result<Coupon, RepositoryError> {
        let kind: CouponKind = parse_column(&self.kind, "coupon kind")?;
        Ok(Coupon {
            id: CouponId::new(self.id),
            code: self.code,
            kind,
            value: self.value,
            min_order_amount: self.min_order_amount,
            max_discount: self.max_discount,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const COUPON_SELECT: &str = r"
    SELECT id, code, kind, value, min_order_amount, max_discount,
           starts_at, ends_at, usage_limit, usage_count, is_active,
           created_at, updated_at
    FROM shop.coupons
";

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a coupon by code, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let query = format!("{COUPON_SELECT} WHERE code = UPPER($1)");
        let row: Option<CouponRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(self.pool)
            .await?;

        row.map(CouponRow::into_coupon).transpose()
    }

    /// Get a coupon by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let query = format!("{COUPON_SELECT} WHERE id = $1");
        let row: Option<CouponRow> = sqlx::query_as(&query)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(CouponRow::into_coupon).transpose()
    }

    /// List coupons, newest first (studio).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Coupon>, RepositoryError> {
        let query = format!(
            "{COUPON_SELECT} WHERE $1 OR is_active ORDER BY created_at DESC, id DESC"
        );
        let rows: Vec<CouponRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(CouponRow::into_coupon).collect()
    }

    /// Create a coupon. Input must already have passed
    /// [`crate::coupon::validate_new`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    pub async fn create(&self, input: &NewCoupon) -> Result<Coupon, RepositoryError> {
        let row: CouponRow = sqlx::query_as(
            r"
            INSERT INTO shop.coupons
                (code, kind, value, min_order_amount, max_discount,
                 starts_at, ends_at, usage_limit)
            VALUES (UPPER($1), $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, code, kind, value, min_order_amount, max_discount,
                      starts_at, ends_at, usage_limit, usage_count, is_active,
                      created_at, updated_at
            ",
        )
        .bind(&input.code)
        .bind(input.kind.to_string())
        .bind(input.value)
        .bind(input.min_order_amount)
        .bind(input.max_discount)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.usage_limit)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "coupon code already exists"))?;

        row.into_coupon()
    }

    /// Update a coupon's bounds and active flag (studio).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon does not exist.
    pub async fn update(
        &self,
        id: CouponId,
        input: &UpdateCoupon,
    ) -> Result<Coupon, RepositoryError> {
        let row: Option<CouponRow> = sqlx::query_as(
            r"
            UPDATE shop.coupons
            SET min_order_amount = CASE WHEN $2 THEN $3 ELSE min_order_amount END,
                max_discount = CASE WHEN $4 THEN $5 ELSE max_discount END,
                starts_at = CASE WHEN $6 THEN $7 ELSE starts_at END,
                ends_at = CASE WHEN $8 THEN $9 ELSE ends_at END,
                usage_limit = CASE WHEN $10 THEN $11 ELSE usage_limit END,
                is_active = COALESCE($12, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, code, kind, value, min_order_amount, max_discount,
                      starts_at, ends_at, usage_limit, usage_count, is_active,
                      created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(input.min_order_amount.is_some())
        .bind(input.min_order_amount.flatten())
        .bind(input.max_discount.is_some())
        .bind(input.max_discount.flatten())
        .bind(input.starts_at.is_some())
        .bind(input.starts_at.flatten())
        .bind(input.ends_at.is_some())
        .bind(input.ends_at.flatten())
        .bind(input.usage_limit.is_some())
        .bind(input.usage_limit.flatten())
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_coupon()
    }

    /// Deactivate a coupon (studio).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon does not exist.
    pub async fn deactivate(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.coupons SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
