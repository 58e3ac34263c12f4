//! Stripe API request and response types.
//!
//! Only the fields this application reads are modeled; everything else in
//! Stripe's payloads is ignored during deserialization.

use std::collections::HashMap;

use serde::Deserialize;

use golden_fig_commerce::checkout::LineItem;

/// Input for creating a Checkout Session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
    /// Our cart id, echoed back in webhook events.
    pub client_reference_id: String,
    pub customer_email: Option<String>,
    /// Provider coupon id to apply, when the native path succeeded.
    pub coupon: Option<String>,
    /// Free-form metadata echoed back in webhook events.
    pub metadata: Vec<(String, String)>,
}

/// A created Checkout Session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page URL to redirect the shopper to.
    pub url: Option<String>,
    pub payment_intent: Option<String>,
}

/// A created provider coupon.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCoupon {
    pub id: String,
}

/// Webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

/// Event payload wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// The `checkout.session` object carried by session events.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub payment_intent: Option<String>,
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub customer_details: Option<CustomerDetails>,
}

impl CheckoutSessionObject {
    /// The idempotency key for order creation: the payment intent when
    /// present, otherwise the session id (e.g., free orders).
    #[must_use]
    pub fn intent_key(&self) -> &str {
        self.payment_intent.as_deref().unwrap_or(&self.id)
    }
}

/// Customer contact details on a completed session.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

/// The `payment_intent` object carried by payment events.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_event_envelope_parses() {
        let payload = serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "payment_intent": "pi_123",
                    "client_reference_id": "42",
                    "metadata": { "cart_id": "42" },
                    "customer_details": { "email": "shopper@example.com" }
                }
            }
        });

        let event: StripeEvent = serde_json::from_value(payload).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");

        let session: CheckoutSessionObject =
            serde_json::from_value(event.data.object).unwrap();
        assert_eq!(session.intent_key(), "pi_123");
        assert_eq!(session.metadata.get("cart_id").unwrap(), "42");
        assert_eq!(
            session.customer_details.unwrap().email.unwrap(),
            "shopper@example.com"
        );
    }

    #[test]
    fn test_intent_key_falls_back_to_session_id() {
        let session = CheckoutSessionObject {
            id: "cs_test_2".to_owned(),
            payment_intent: None,
            client_reference_id: None,
            metadata: HashMap::new(),
            customer_details: None,
        };
        assert_eq!(session.intent_key(), "cs_test_2");
    }
}
