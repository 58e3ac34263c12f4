//! Product management route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use golden_fig_commerce::db::{InventoryRepository, ProductRepository};
use golden_fig_commerce::models::product::{
    NewProduct, Product, ProductFilter, ProductImage, ProductSummary, UpdateProduct,
};
use golden_fig_core::{ProductId, ProductImageId};

use crate::error::{AppError, Result};
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

/// List products, archived included.
#[instrument(skip(_staff, state))]
pub async fn index(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductSummary>>> {
    let products = ProductRepository::new(state.pool())
        .list_all(&filter)
        .await?;
    Ok(Json(products))
}

/// Product detail by id.
#[instrument(skip(_staff, state))]
pub async fn show(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

/// Create a product with its inventory row.
#[instrument(skip(_staff, state, input))]
pub async fn create(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> Result<Json<Product>> {
    if input.name.trim().is_empty() || input.slug.trim().is_empty() {
        return Err(AppError::BadRequest(
            "product name and slug are required".to_owned(),
        ));
    }
    if input.price < rust_decimal::Decimal::ZERO {
        return Err(AppError::BadRequest("price cannot be negative".to_owned()));
    }

    let product = ProductRepository::new(state.pool()).create(&input).await?;
    Ok(Json(product))
}

/// Update a product; omitted fields are left unchanged.
#[instrument(skip(_staff, state, input))]
pub async fn update(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    if let Some(price) = input.price
        && price < rust_decimal::Decimal::ZERO
    {
        return Err(AppError::BadRequest("price cannot be negative".to_owned()));
    }

    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(product))
}

/// Archive a product (kept resolvable for existing orders).
#[instrument(skip(_staff, state))]
pub async fn archive(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    ProductRepository::new(state.pool()).archive(id).await?;
    Ok(Json(serde_json::json!({ "archived": true })))
}

/// Image attachment payload.
#[derive(Debug, Deserialize)]
pub struct AddImageRequest {
    pub url: String,
    pub alt_text: Option<String>,
    pub position: Option<i32>,
}

/// Attach an image to a product.
#[instrument(skip(_staff, state, input))]
pub async fn add_image(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<AddImageRequest>,
) -> Result<Json<ProductImage>> {
    let image = ProductRepository::new(state.pool())
        .add_image(
            id,
            &input.url,
            input.alt_text.as_deref(),
            input.position.unwrap_or(0),
        )
        .await?;
    Ok(Json(image))
}

/// Remove an image from a product.
#[instrument(skip(_staff, state))]
pub async fn remove_image(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path((_id, image_id)): Path<(ProductId, ProductImageId)>,
) -> Result<Json<serde_json::Value>> {
    ProductRepository::new(state.pool())
        .remove_image(image_id)
        .await?;
    Ok(Json(serde_json::json!({ "removed": true })))
}

/// Inventory mutation payload: absolute set or signed adjustment.
#[derive(Debug, Deserialize)]
pub struct InventoryRequest {
    /// Absolute stock level.
    pub quantity: Option<i32>,
    /// Signed delta (receiving or correction).
    pub adjust: Option<i32>,
}

/// Set or adjust stock on hand.
#[instrument(skip(_staff, state, input))]
pub async fn update_inventory(
    RequireStaffAuth(_staff): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<InventoryRequest>,
) -> Result<Json<serde_json::Value>> {
    let inventory = InventoryRepository::new(state.pool());

    let on_hand = match (input.quantity, input.adjust) {
        (Some(quantity), None) => {
            if quantity < 0 {
                return Err(AppError::BadRequest("quantity cannot be negative".to_owned()));
            }
            inventory.set(id, quantity).await?;
            quantity
        }
        (None, Some(delta)) => inventory.adjust(id, delta).await?,
        _ => {
            return Err(AppError::BadRequest(
                "provide exactly one of quantity or adjust".to_owned(),
            ));
        }
    };

    Ok(Json(serde_json::json!({ "quantity_on_hand": on_hand })))
}
