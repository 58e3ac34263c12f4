//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /products                       - Product listing (filterable)
//! GET  /products/{slug}                - Product detail
//! GET  /products/{slug}/recommendations - Recommended products
//! GET  /products/{slug}/reviews        - Reviews
//! POST /products/{slug}/reviews        - Create review (auth)
//!
//! # Cart
//! GET    /cart                 - Current cart with totals
//! DELETE /cart                 - Clear cart
//! POST   /cart/items           - Add product
//! PATCH  /cart/items/{id}      - Set line quantity (0 removes)
//! DELETE /cart/items/{id}      - Remove line
//! POST   /cart/coupon          - Apply coupon code
//! DELETE /cart/coupon          - Remove coupon
//!
//! # Checkout
//! POST /checkout               - Create hosted checkout session
//!
//! # Wishlist
//! GET    /wishlist                          - Current wishlist
//! POST   /wishlist/items                    - Save product
//! DELETE /wishlist/items/{id}               - Remove item
//! POST   /wishlist/items/{id}/move-to-cart  - Move item into cart
//!
//! # Account (requires auth)
//! GET  /account                - Current shopper
//! GET  /account/orders         - Order history
//! GET  /account/orders/{id}    - Order detail with history
//!
//! # Auth
//! POST /auth/register          - Register and log in
//! POST /auth/login             - Log in
//! POST /auth/logout            - Log out
//!
//! # Webhooks
//! POST /webhooks/stripe        - Payment provider events (signed)
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;
pub mod webhooks;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{slug}/recommendations", get(products::recommendations))
        .route(
            "/{slug}/reviews",
            get(products::reviews).post(products::create_review),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route(
            "/coupon",
            post(cart::apply_coupon).delete(cart::remove_coupon),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/items", post(wishlist::add_item))
        .route("/items/{id}", delete(wishlist::remove_item))
        .route("/items/{id}/move-to-cart", post(wishlist::move_to_cart))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::me))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::create))
        .nest("/wishlist", wishlist_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .route("/webhooks/stripe", post(webhooks::stripe))
}
