//! Coupon models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use golden_fig_core::{CouponId, CouponKind};

/// A time- and usage-bounded discount rule.
#[derive(Debug, Clone, Serialize)]
pub struct Coupon {
    pub id: CouponId,
    /// Stored uppercase; lookups are case-insensitive.
    pub code: String,
    pub kind: CouponKind,
    /// Percentage in (0, 100] for `Percentage`, amount for `Fixed`.
    pub value: Decimal,
    /// Minimum order subtotal for the coupon to apply.
    pub min_order_amount: Option<Decimal>,
    /// Cap on the computed discount.
    pub max_discount: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a coupon (studio).
#[derive(Debug, Clone, Deserialize)]
pub struct NewCoupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
}

/// Input for updating a coupon (studio). `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCoupon {
    pub min_order_amount: Option<Option<Decimal>>,
    pub max_discount: Option<Option<Decimal>>,
    pub starts_at: Option<Option<DateTime<Utc>>>,
    pub ends_at: Option<Option<DateTime<Utc>>>,
    pub usage_limit: Option<Option<i32>>,
    pub is_active: Option<bool>,
}
