//! HTTP route handlers for the studio management API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//!
//! # Auth
//! POST /auth/login             - Staff login
//! POST /auth/logout            - Staff logout
//!
//! # Products (staff only)
//! GET    /products                       - List (archived included)
//! POST   /products                       - Create
//! GET    /products/{id}                  - Detail
//! PATCH  /products/{id}                  - Update
//! DELETE /products/{id}                  - Archive
//! POST   /products/{id}/images           - Attach image
//! DELETE /products/{id}/images/{imageId} - Remove image
//! PATCH  /products/{id}/inventory        - Set/adjust stock
//!
//! # Coupons (staff only)
//! GET    /coupons              - List with usage counts
//! POST   /coupons              - Create (validated)
//! PATCH  /coupons/{id}         - Update bounds / active flag
//! DELETE /coupons/{id}         - Deactivate
//!
//! # Orders (staff only)
//! GET  /orders                 - List, filterable by status
//! GET  /orders/{id}            - Detail with history
//! POST /orders/{id}/status     - Transition with reason
//! ```

pub mod auth;
pub mod coupons;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product management router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::archive),
        )
        .route("/{id}/images", post(products::add_image))
        .route("/{id}/images/{image_id}", delete(products::remove_image))
        .route("/{id}/inventory", patch(products::update_inventory))
}

/// Create the coupon management router.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(coupons::index).post(coupons::create))
        .route(
            "/{id}",
            patch(coupons::update).delete(coupons::deactivate),
        )
}

/// Create the order management router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::transition))
}

/// Create all routes for the studio.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/coupons", coupon_routes())
        .nest("/orders", order_routes())
}
