//! Stripe webhook endpoint.
//!
//! Payment lifecycle events enter here and call the same order mutations
//! the rest of the app uses. Order creation is idempotent on the payment
//! intent id: a duplicate delivery finds the existing order and reports
//! `already_exists` instead of creating a second one.
//!
//! Processed and ignored events return 200 so the provider stops
//! retrying; processing failures return 500 to trigger a retry.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use golden_fig_commerce::db::{CartRepository, OrderRepository};
use golden_fig_commerce::orders::OrderService;
use golden_fig_core::{CartId, OrderStatus, PaymentStatus};
use secrecy::ExposeSecret;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::stripe::types::{CheckoutSessionObject, PaymentIntentObject, StripeEvent};
use crate::stripe::webhook;

/// Webhook acknowledgement payload.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<golden_fig_core::OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_exists: Option<bool>,
}

impl WebhookAck {
    const fn ignored() -> Self {
        Self {
            received: true,
            order_id: None,
            already_exists: None,
        }
    }
}

/// Handle a Stripe webhook delivery.
#[instrument(skip(state, headers, body))]
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    // Signature check happens before anything in the body is trusted.
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing signature header".to_owned()))?;

    webhook::verify_signature(
        state.config().stripe.webhook_secret.expose_secret(),
        &body,
        signature,
        Utc::now().timestamp(),
    )
    .map_err(|e| AppError::BadRequest(format!("invalid signature: {e}")))?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed event: {e}")))?;

    match event.event_type.as_str() {
        "checkout.session.completed" => session_completed(&state, &event).await,
        "checkout.session.expired" => session_expired(&state, &event).await,
        "payment_intent.payment_failed" => payment_failed(&state, &event).await,
        other => {
            info!(event_type = other, event_id = %event.id, "ignoring webhook event");
            Ok(Json(WebhookAck::ignored()))
        }
    }
}

/// A completed checkout: create the confirmed, paid order from the cart
/// named in the session metadata.
async fn session_completed(state: &AppState, event: &StripeEvent) -> Result<Json<WebhookAck>> {
    let session: CheckoutSessionObject = serde_json::from_value(event.data.object.clone())
        .map_err(|e| AppError::BadRequest(format!("malformed session object: {e}")))?;

    let cart_id = session
        .metadata
        .get("cart_id")
        .cloned()
        .or_else(|| session.client_reference_id.clone())
        .and_then(|raw| raw.parse::<i32>().ok())
        .map(CartId::new);

    let Some(cart_id) = cart_id else {
        warn!(event_id = %event.id, "completed session carries no cart id");
        return Ok(Json(WebhookAck::ignored()));
    };

    let Some(cart) = CartRepository::new(state.pool()).get_by_id(cart_id).await? else {
        warn!(event_id = %event.id, %cart_id, "completed session references unknown cart");
        return Ok(Json(WebhookAck::ignored()));
    };

    let email = session
        .customer_details
        .as_ref()
        .and_then(|d| d.email.as_deref());

    let outcome = OrderService::new(state.pool())
        .create_from_cart(
            &cart,
            session.intent_key(),
            email,
            OrderStatus::Confirmed,
            PaymentStatus::Paid,
        )
        .await?;

    if outcome.already_exists {
        info!(
            event_id = %event.id,
            order_id = %outcome.order.id,
            "duplicate webhook delivery, order already exists"
        );
    }
    for warning in &outcome.stock_warnings {
        warn!(order_id = %outcome.order.id, %warning, "stock walk incomplete");
    }

    Ok(Json(WebhookAck {
        received: true,
        order_id: Some(outcome.order.id),
        already_exists: Some(outcome.already_exists),
    }))
}

/// An expired session: if an order was already created for the intent,
/// mark it failed; otherwise nothing to do.
async fn session_expired(state: &AppState, event: &StripeEvent) -> Result<Json<WebhookAck>> {
    let session: CheckoutSessionObject = serde_json::from_value(event.data.object.clone())
        .map_err(|e| AppError::BadRequest(format!("malformed session object: {e}")))?;

    fail_order_for_intent(state, session.intent_key(), "checkout session expired").await
}

/// A failed payment: mark the matching order failed, if one exists.
async fn payment_failed(state: &AppState, event: &StripeEvent) -> Result<Json<WebhookAck>> {
    let intent: PaymentIntentObject = serde_json::from_value(event.data.object.clone())
        .map_err(|e| AppError::BadRequest(format!("malformed payment intent object: {e}")))?;

    fail_order_for_intent(state, &intent.id, "payment failed").await
}

async fn fail_order_for_intent(
    state: &AppState,
    payment_intent_id: &str,
    reason: &str,
) -> Result<Json<WebhookAck>> {
    let Some(order) = OrderRepository::new(state.pool())
        .find_by_payment_intent(payment_intent_id)
        .await?
    else {
        return Ok(Json(WebhookAck::ignored()));
    };

    let outcome = OrderService::new(state.pool())
        .transition(
            order.id,
            Some(OrderStatus::Failed),
            Some(PaymentStatus::Failed),
            reason,
        )
        .await?;

    Ok(Json(WebhookAck {
        received: true,
        order_id: Some(outcome.order.id),
        already_exists: None,
    }))
}
