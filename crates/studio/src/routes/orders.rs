//! Order management route handlers.
//!
//! Status transitions go through the lifecycle service so the inventory
//! pairing (reserve on confirmation, release on cancellation) always
//! applies, with tolerated stock failures surfaced as warnings.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use golden_fig_commerce::db::OrderRepository;
use golden_fig_commerce::models::{Order, OrderHistoryEntry};
use golden_fig_commerce::orders::OrderService;
use golden_fig_core::{OrderId, OrderStatus, PaymentStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

/// Default page size for order listings.
const DEFAULT_PAGE: i64 = 50;

/// Listing query.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List orders, optionally filtered by status, newest first.
#[instrument(skip(_staff, state))]
pub async fn index(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list(
            query.status,
            query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, 200),
            query.offset.unwrap_or(0).max(0),
        )
        .await?;
    Ok(Json(orders))
}

/// Order detail payload with history.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub history: Vec<OrderHistoryEntry>,
}

/// Order detail with its audit history.
#[instrument(skip(_staff, state))]
pub async fn show(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let history = repo.history(id).await?;
    Ok(Json(OrderDetail { order, history }))
}

/// Status transition payload.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub reason: String,
}

/// Transition outcome payload, including tolerated stock warnings.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    #[serde(flatten)]
    pub order: Order,
    pub stock_warnings: Vec<String>,
}

/// Transition an order's status and/or payment status.
#[instrument(skip(staff, state, request))]
pub async fn transition(
    RequireStaffAuth(staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>> {
    if request.status.is_none() && request.payment_status.is_none() {
        return Err(AppError::BadRequest(
            "provide a status or payment_status to set".to_owned(),
        ));
    }
    if request.reason.trim().is_empty() {
        return Err(AppError::BadRequest("a reason is required".to_owned()));
    }

    let reason = format!("{} (by {})", request.reason.trim(), staff.email);
    let outcome = OrderService::new(state.pool())
        .transition(id, request.status, request.payment_status, &reason)
        .await?;

    Ok(Json(TransitionResponse {
        order: outcome.order,
        stock_warnings: outcome.stock_warnings,
    }))
}
