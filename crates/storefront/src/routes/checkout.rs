//! Checkout route handler.
//!
//! Builds Stripe line items from the active cart and creates a hosted
//! Checkout Session. Coupons take the provider-native path first (a
//! single-use Stripe coupon mirroring ours); if that call fails, the
//! session is created undiscounted and the discount is applied to the
//! order when the webhook lands - the manual fallback.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use golden_fig_commerce::checkout;
use golden_fig_commerce::coupon;
use golden_fig_commerce::db::{CartRepository, CouponRepository};
use golden_fig_core::CouponKind;

use crate::error::{AppError, Result};
use crate::models::session::{current_user, resolve_owner};
use crate::state::AppState;
use crate::stripe::types::CheckoutSessionParams;

/// Checkout creation response.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Hosted payment page to redirect the shopper to.
    pub checkout_url: String,
    pub session_id: String,
}

/// Create a Checkout Session for the active cart.
#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutResponse>> {
    let owner = resolve_owner(&session).await?;
    let cart = CartRepository::new(state.pool())
        .find_active(owner)
        .await?
        .ok_or_else(|| AppError::BadRequest("cart is empty".to_owned()))?;

    let line_items = checkout::build_line_items(&cart)?;

    // Revalidate the attached coupon against the subtotal before paying.
    let attached = match &cart.coupon_code {
        Some(code) => {
            let coupon = CouponRepository::new(state.pool())
                .get_by_code(code)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("coupon {code}")))?;
            coupon::validate(&coupon, cart.subtotal(), Utc::now())?;
            Some(coupon)
        }
        None => None,
    };

    // Provider-native discount first; on failure (or when provider terms
    // cannot express our caps) fall back to applying the discount at order
    // creation.
    let provider_coupon = match attached.as_ref().and_then(|c| native_value(c, &cart)) {
        Some((coupon, kind, value)) => {
            let result = state
                .stripe()
                .create_coupon(&coupon.code, kind, value, cart.currency().code())
                .await;
            match result {
                Ok(created) => Some(created.id),
                Err(e) => {
                    warn!(code = %coupon.code, error = %e, "provider coupon failed, falling back to manual discount");
                    None
                }
            }
        }
        None => None,
    };

    let base_url = &state.config().base_url;
    let params = CheckoutSessionParams {
        line_items,
        success_url: format!("{base_url}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{base_url}/cart"),
        client_reference_id: cart.id.to_string(),
        customer_email: current_user(&session).await.map(|u| u.email.into_inner()),
        coupon: provider_coupon,
        metadata: vec![("cart_id".to_owned(), cart.id.to_string())],
    };

    let checkout_session = state.stripe().create_checkout_session(&params).await?;

    let url = checkout_session
        .url
        .ok_or_else(|| AppError::Internal("checkout session has no URL".to_owned()))?;

    Ok(Json(CheckoutResponse {
        checkout_url: url,
        session_id: checkout_session.id,
    }))
}

/// The terms to mirror into the provider coupon, when they are
/// expressible.
///
/// Percentage coupons map to `percent_off` unless `max_discount` would
/// bind, which Stripe percent coupons cannot express - those go manual.
/// Fixed coupons mirror the capped computed discount as `amount_off`.
fn native_value<'c>(
    coupon: &'c golden_fig_commerce::models::Coupon,
    cart: &golden_fig_commerce::models::Cart,
) -> Option<(
    &'c golden_fig_commerce::models::Coupon,
    CouponKind,
    rust_decimal::Decimal,
)> {
    let subtotal = cart.subtotal();
    match coupon.kind {
        CouponKind::Percentage => {
            let raw = (subtotal * coupon.value / rust_decimal::Decimal::ONE_HUNDRED).round_dp(2);
            if coupon::discount_for(coupon, subtotal) < raw {
                None
            } else {
                Some((coupon, CouponKind::Percentage, coupon.value))
            }
        }
        CouponKind::Fixed => Some((
            coupon,
            CouponKind::Fixed,
            coupon::discount_for(coupon, subtotal),
        )),
    }
}
