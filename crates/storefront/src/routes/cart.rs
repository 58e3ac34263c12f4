//! Cart route handlers.
//!
//! Carts belong to the logged-in shopper or, for anonymous sessions, to a
//! guest token held in the session. Responses always include recomputed
//! totals with the attached coupon's discount preview.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use golden_fig_commerce::checkout;
use golden_fig_commerce::coupon;
use golden_fig_commerce::db::{CartRepository, CouponRepository};
use golden_fig_commerce::models::{Cart, CartItem, CartTotals};
use golden_fig_core::{CartId, CartItemId, ProductId};

use crate::error::{AppError, Result};
use crate::models::session::resolve_owner;
use crate::state::AppState;

/// Cart payload returned by every cart operation.
#[derive(Debug, Serialize)]
pub struct CartView {
    /// Absent until the first mutation creates the cart.
    pub id: Option<CartId>,
    pub items: Vec<CartItem>,
    pub coupon_code: Option<String>,
    pub totals: CartTotals,
}

impl CartView {
    fn empty() -> Self {
        Self {
            id: None,
            items: Vec::new(),
            coupon_code: None,
            totals: CartTotals {
                subtotal: rust_decimal::Decimal::ZERO,
                discount: rust_decimal::Decimal::ZERO,
                total: rust_decimal::Decimal::ZERO,
                item_count: 0,
            },
        }
    }
}

/// Build the response payload, resolving the attached coupon for the
/// discount preview.
async fn view(state: &AppState, cart: Cart) -> Result<CartView> {
    let attached = match &cart.coupon_code {
        Some(code) => CouponRepository::new(state.pool()).get_by_code(code).await?,
        None => None,
    };

    let totals = checkout::totals(&cart, attached.as_ref(), Utc::now());

    Ok(CartView {
        id: Some(cart.id),
        items: cart.items,
        coupon_code: cart.coupon_code,
        totals,
    })
}

/// Show the current cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let owner = resolve_owner(&session).await?;
    match CartRepository::new(state.pool()).find_active(owner).await? {
        Some(cart) => Ok(Json(view(&state, cart).await?)),
        None => Ok(Json(CartView::empty())),
    }
}

/// Add-to-cart payload.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: Option<i32>,
}

/// Add a product to the cart, creating the cart on first use.
#[instrument(skip(state, session))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let owner = resolve_owner(&session).await?;
    let cart = CartRepository::new(state.pool())
        .add_item(owner, request.product_id, request.quantity.unwrap_or(1))
        .await?;
    Ok(Json(view(&state, cart).await?))
}

/// Quantity update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Set a line's quantity; zero removes the line.
#[instrument(skip(state, session))]
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<CartItemId>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let owner = resolve_owner(&session).await?;
    let cart = CartRepository::new(state.pool())
        .update_item(owner, item_id, request.quantity)
        .await?;
    Ok(Json(view(&state, cart).await?))
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let owner = resolve_owner(&session).await?;
    let cart = CartRepository::new(state.pool())
        .remove_item(owner, item_id)
        .await?;
    Ok(Json(view(&state, cart).await?))
}

/// Remove every line from the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let owner = resolve_owner(&session).await?;
    match CartRepository::new(state.pool()).clear(owner).await {
        Ok(cart) => Ok(Json(view(&state, cart).await?)),
        // Clearing a cart that was never created is already clear.
        Err(golden_fig_commerce::db::RepositoryError::NotFound) => Ok(Json(CartView::empty())),
        Err(e) => Err(e.into()),
    }
}

/// Coupon application payload.
#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

/// Attach a coupon to the cart after validating it against the subtotal.
#[instrument(skip(state, session, request))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ApplyCouponRequest>,
) -> Result<Json<CartView>> {
    let owner = resolve_owner(&session).await?;
    let carts = CartRepository::new(state.pool());
    let cart = carts
        .find_active(owner)
        .await?
        .ok_or_else(|| AppError::BadRequest("cart is empty".to_owned()))?;

    let coupon = CouponRepository::new(state.pool())
        .get_by_code(&request.code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("coupon {}", request.code)))?;

    coupon::validate(&coupon, cart.subtotal(), Utc::now())?;

    carts.set_coupon_code(cart.id, Some(&coupon.code)).await?;
    let cart = carts
        .get_by_id(cart.id)
        .await?
        .ok_or_else(|| AppError::Internal("cart vanished".to_owned()))?;

    Ok(Json(view(&state, cart).await?))
}

/// Detach the coupon from the cart.
#[instrument(skip(state, session))]
pub async fn remove_coupon(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>> {
    let owner = resolve_owner(&session).await?;
    let carts = CartRepository::new(state.pool());
    let cart = carts
        .find_active(owner)
        .await?
        .ok_or_else(|| AppError::NotFound("cart".to_owned()))?;

    carts.set_coupon_code(cart.id, None).await?;
    let cart = carts
        .get_by_id(cart.id)
        .await?
        .ok_or_else(|| AppError::Internal("cart vanished".to_owned()))?;

    Ok(Json(view(&state, cart).await?))
}
