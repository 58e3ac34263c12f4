//! Coupon management route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use golden_fig_commerce::coupon;
use golden_fig_commerce::db::CouponRepository;
use golden_fig_commerce::models::{Coupon, NewCoupon, UpdateCoupon};
use golden_fig_core::CouponId;

use crate::error::{AppError, Result};
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

/// Listing query.
#[derive(Debug, Deserialize)]
pub struct CouponListQuery {
    /// Include deactivated coupons (default true for the studio).
    pub include_inactive: Option<bool>,
}

/// List coupons with usage counts, newest first.
#[instrument(skip(_staff, state))]
pub async fn index(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<CouponListQuery>,
) -> Result<Json<Vec<Coupon>>> {
    let coupons = CouponRepository::new(state.pool())
        .list(query.include_inactive.unwrap_or(true))
        .await?;
    Ok(Json(coupons))
}

/// Create a coupon after creation-time validation (a percentage above
/// 100 is rejected here).
#[instrument(skip(_staff, state, input))]
pub async fn create(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Json(input): Json<NewCoupon>,
) -> Result<Json<Coupon>> {
    coupon::validate_new(&input)?;

    let coupon = CouponRepository::new(state.pool()).create(&input).await?;
    Ok(Json(coupon))
}

/// Update a coupon's bounds or active flag.
#[instrument(skip(_staff, state, input))]
pub async fn update(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
    Json(input): Json<UpdateCoupon>,
) -> Result<Json<Coupon>> {
    if let Some(Some(limit)) = input.usage_limit
        && limit <= 0
    {
        return Err(AppError::BadRequest(
            "usage limit must be greater than 0".to_owned(),
        ));
    }

    let coupon = CouponRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(coupon))
}

/// Deactivate a coupon.
#[instrument(skip(_staff, state))]
pub async fn deactivate(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<Json<serde_json::Value>> {
    CouponRepository::new(state.pool()).deactivate(id).await?;
    Ok(Json(serde_json::json!({ "deactivated": true })))
}
