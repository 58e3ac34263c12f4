//! Stripe API client.
//!
//! Form-encoded requests against the Stripe REST API, authenticated with
//! the secret key. Only the endpoints this application needs are wrapped:
//! Checkout Sessions and Coupons.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use golden_fig_core::CouponKind;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::StripeError;
use super::types::{CheckoutSession, CheckoutSessionParams, StripeCoupon};
use crate::config::StripeConfig;

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    api_base: String,
    secret_key: SecretString,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base)
            .field("secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.clone(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Create a Checkout Session for a hosted payment page.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or Stripe rejects the input.
    #[instrument(skip(self, params), fields(client_reference_id = %params.client_reference_id))]
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, StripeError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), params.success_url.clone()),
            ("cancel_url".into(), params.cancel_url.clone()),
            (
                "client_reference_id".into(),
                params.client_reference_id.clone(),
            ),
        ];

        if let Some(email) = &params.customer_email {
            form.push(("customer_email".into(), email.clone()));
        }

        for (i, item) in params.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                item.currency.to_owned(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        if let Some(coupon) = &params.coupon {
            form.push(("discounts[0][coupon]".into(), coupon.clone()));
        }

        for (key, value) in &params.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let session: CheckoutSession = self.post_form("/v1/checkout/sessions", &form).await?;

        debug!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }

    /// Create a single-use provider coupon mirroring one of ours.
    ///
    /// Percentage coupons map to `percent_off`; fixed coupons to
    /// `amount_off` in minor units.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Parse` when the value cannot be expressed in
    /// provider terms, or an API error from Stripe.
    #[instrument(skip(self))]
    pub async fn create_coupon(
        &self,
        name: &str,
        kind: CouponKind,
        value: Decimal,
        currency: &str,
    ) -> Result<StripeCoupon, StripeError> {
        let mut form: Vec<(String, String)> = vec![
            ("duration".into(), "once".into()),
            ("name".into(), name.to_owned()),
        ];

        match kind {
            CouponKind::Percentage => {
                form.push(("percent_off".into(), value.to_string()));
            }
            CouponKind::Fixed => {
                let minor = (value * Decimal::ONE_HUNDRED)
                    .round_dp(0)
                    .to_i64()
                    .ok_or_else(|| {
                        StripeError::Parse(format!("coupon amount out of range: {value}"))
                    })?;
                form.push(("amount_off".into(), minor.to_string()));
                form.push(("currency".into(), currency.to_owned()));
            }
        }

        self.post_form("/v1/coupons", &form).await
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeError> {
        let response = self
            .client
            .post(format!("{}{path}", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}
