//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use golden_fig_commerce::db::{CartRepository, WishlistRepository};
use golden_fig_commerce::models::Wishlist;
use golden_fig_core::{ProductId, WishlistItemId};

use crate::error::{AppError, Result};
use crate::models::session::resolve_owner;
use crate::state::AppState;

/// Show the current wishlist.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<Wishlist>> {
    let owner = resolve_owner(&session).await?;
    let wishlist = WishlistRepository::new(state.pool())
        .get_or_create(owner)
        .await?;
    Ok(Json(wishlist))
}

/// Add-to-wishlist payload.
#[derive(Debug, Deserialize)]
pub struct AddWishlistItemRequest {
    pub product_id: ProductId,
}

/// Save a product to the wishlist; saving a duplicate is a no-op.
#[instrument(skip(state, session))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddWishlistItemRequest>,
) -> Result<Json<Wishlist>> {
    let owner = resolve_owner(&session).await?;
    let wishlist = WishlistRepository::new(state.pool())
        .add_item(owner, request.product_id)
        .await?;
    Ok(Json(wishlist))
}

/// Remove an item from the wishlist.
#[instrument(skip(state, session))]
pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<WishlistItemId>,
) -> Result<Json<Wishlist>> {
    let owner = resolve_owner(&session).await?;
    let wishlist = WishlistRepository::new(state.pool())
        .remove_item(owner, item_id)
        .await?;
    Ok(Json(wishlist))
}

/// Move a saved product into the cart, removing it from the wishlist.
#[instrument(skip(state, session))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<WishlistItemId>,
) -> Result<Json<Wishlist>> {
    let owner = resolve_owner(&session).await?;
    let wishlists = WishlistRepository::new(state.pool());

    let wishlist = wishlists.get_or_create(owner).await?;
    let item = wishlist
        .items
        .iter()
        .find(|item| item.id == item_id)
        .ok_or_else(|| AppError::NotFound(format!("wishlist item {item_id}")))?;

    CartRepository::new(state.pool())
        .add_item(owner, item.product_id, 1)
        .await?;

    let wishlist = wishlists.remove_item(owner, item_id).await?;
    Ok(Json(wishlist))
}
