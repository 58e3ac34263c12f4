//! Catalog route handlers: product listings, detail, recommendations,
//! and reviews.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use golden_fig_commerce::db::ProductRepository;
use golden_fig_commerce::models::product::{Product, ProductFilter, ProductSummary, Review};
use golden_fig_commerce::recommendations::{self, ScoredProduct};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// List active products matching the filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductSummary>>> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// Product detail by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;
    Ok(Json(product))
}

/// Recommendations for a product, cached for a short TTL.
#[instrument(skip(state))]
pub async fn recommendations(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ScoredProduct>>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let cached = state
        .recommendation_cache()
        .try_get_with(product.id, async {
            recommendations::recommend(&repo, &product, recommendations::DEFAULT_LIMIT)
                .await
                .map(Arc::new)
        })
        .await
        .map_err(|e: Arc<golden_fig_commerce::db::RepositoryError>| {
            AppError::Internal(format!("recommendation lookup failed: {e}"))
        })?;

    Ok(Json(cached.as_ref().clone()))
}

/// List reviews for a product, newest first.
#[instrument(skip(state))]
pub async fn reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Review>>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let reviews = repo.list_reviews(product.id).await?;
    Ok(Json(reviews))
}

/// Review creation payload.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub body: Option<String>,
}

/// Create a review for a product (one per shopper).
#[instrument(skip(state, user, request))]
pub async fn create_review(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<Review>> {
    if !(1..=5).contains(&request.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_owned(),
        ));
    }

    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let review = repo
        .create_review(product.id, user.id, request.rating, request.body.as_deref())
        .await?;

    Ok(Json(review))
}
