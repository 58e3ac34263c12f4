//! Account route handlers: profile and order history.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use golden_fig_commerce::db::OrderRepository;
use golden_fig_commerce::models::{Order, OrderHistoryEntry, Owner};
use golden_fig_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Default page size for order history.
const DEFAULT_ORDER_PAGE: i64 = 20;

/// Current account overview.
#[instrument]
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

/// Pagination query for order history.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List the shopper's orders, newest first.
#[instrument(skip(state, user))]
pub async fn orders(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(
            user.id,
            query.limit.unwrap_or(DEFAULT_ORDER_PAGE).clamp(1, 100),
            query.offset.unwrap_or(0).max(0),
        )
        .await?;
    Ok(Json(orders))
}

/// Order detail payload, including the audit history.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub history: Vec<OrderHistoryEntry>,
}

/// Order detail, scoped to the owner.
#[instrument(skip(state, user))]
pub async fn order_detail(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(order_id)
        .await?
        .filter(|order| order.owner == Owner::User(user.id))
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    let history = repo.history(order.id).await?;
    Ok(Json(OrderDetail { order, history }))
}
