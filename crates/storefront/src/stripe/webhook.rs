//! Webhook signature verification.
//!
//! Stripe signs webhook payloads with an HMAC-SHA256 over
//! `"{timestamp}.{body}"`, delivered in the `Stripe-Signature` header as
//! `t=<unix>,v1=<hex>`. Verification is constant-time and rejects
//! timestamps outside the replay tolerance before the handler body runs.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Replay tolerance for webhook timestamps (5 minutes).
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Errors verifying a webhook signature header.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("malformed signature header")]
    MalformedHeader,

    #[error("signature timestamp outside tolerance")]
    TimestampOutOfTolerance,

    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Verify a `Stripe-Signature` header against the payload.
///
/// # Errors
///
/// Returns `WebhookError::MalformedHeader` when the header is missing the
/// `t=` or `v1=` parts, `TimestampOutOfTolerance` for stale or future
/// timestamps, and `SignatureMismatch` when the HMAC does not match.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now_unix: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = value.parse().ok();
            }
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }

    if (now_unix - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    // HMAC keys accept any length; construction cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::SignatureMismatch)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    // verify_slice is constant-time; accept if any v1 candidate matches.
    for signature in &signatures {
        if mac.clone().verify_slice(signature).is_ok() {
            return Ok(());
        }
    }

    Err(WebhookError::SignatureMismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, SECRET, now));

        assert!(verify_signature(SECRET, payload, &header, now).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, "wrong_secret", now));

        assert_eq!(
            verify_signature(SECRET, payload, &header, now),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_modified_payload_rejected() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let tampered = br#"{"type":"checkout.session.completed","extra":true}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, SECRET, now));

        assert_eq!(
            verify_signature(SECRET, tampered, &header, now),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = b"{}";
        let now = 1_700_000_000;
        let stale = now - TIMESTAMP_TOLERANCE_SECS - 1;
        let header = format!("t={stale},v1={}", sign(payload, SECRET, stale));

        assert_eq!(
            verify_signature(SECRET, payload, &header, now),
            Err(WebhookError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn test_missing_parts_rejected() {
        let payload = b"{}";
        let now = 1_700_000_000;

        assert_eq!(
            verify_signature(SECRET, payload, "v1=deadbeef", now),
            Err(WebhookError::MalformedHeader)
        );
        assert_eq!(
            verify_signature(SECRET, payload, &format!("t={now}"), now),
            Err(WebhookError::MalformedHeader)
        );
    }

    #[test]
    fn test_second_candidate_signature_accepted() {
        let payload = b"{}";
        let now = 1_700_000_000;
        let header = format!(
            "t={now},v1={},v1={}",
            "00".repeat(32),
            sign(payload, SECRET, now)
        );

        assert!(verify_signature(SECRET, payload, &header, now).is_ok());
    }
}
