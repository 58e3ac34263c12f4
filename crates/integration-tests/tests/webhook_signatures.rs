//! Webhook signature verification against the storefront's verifier.
//!
//! Signatures are computed here independently (hmac + sha2 + hex) so the
//! verifier is exercised from the outside, the way Stripe would call it.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use golden_fig_storefront::stripe::webhook::{
    TIMESTAMP_TOLERANCE_SECS, WebhookError, verify_signature,
};

type HmacSha256 = Hmac<Sha256>;

const SECRET: &str = "whsec_integration_secret";
const NOW: i64 = 1_750_000_000;

fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[test]
fn test_valid_delivery_verifies() {
    let payload = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;
    let header = format!("t={NOW},v1={}", sign(payload, SECRET, NOW));

    assert!(verify_signature(SECRET, payload, &header, NOW).is_ok());
}

#[test]
fn test_replayed_delivery_outside_tolerance_rejected() {
    let payload = b"{}";
    let stale = NOW - TIMESTAMP_TOLERANCE_SECS - 1;
    let header = format!("t={stale},v1={}", sign(payload, SECRET, stale));

    assert_eq!(
        verify_signature(SECRET, payload, &header, NOW),
        Err(WebhookError::TimestampOutOfTolerance)
    );
}

#[test]
fn test_delivery_within_tolerance_verifies() {
    let payload = b"{}";
    let recent = NOW - TIMESTAMP_TOLERANCE_SECS;
    let header = format!("t={recent},v1={}", sign(payload, SECRET, recent));

    assert!(verify_signature(SECRET, payload, &header, NOW).is_ok());
}

#[test]
fn test_tampered_payload_rejected() {
    let payload = br#"{"amount":1000}"#;
    let tampered = br#"{"amount":1}"#;
    let header = format!("t={NOW},v1={}", sign(payload, SECRET, NOW));

    assert_eq!(
        verify_signature(SECRET, tampered, &header, NOW),
        Err(WebhookError::SignatureMismatch)
    );
}

#[test]
fn test_wrong_secret_rejected() {
    let payload = b"{}";
    let header = format!("t={NOW},v1={}", sign(payload, "whsec_other", NOW));

    assert_eq!(
        verify_signature(SECRET, payload, &header, NOW),
        Err(WebhookError::SignatureMismatch)
    );
}

#[test]
fn test_header_without_signature_rejected() {
    assert_eq!(
        verify_signature(SECRET, b"{}", &format!("t={NOW}"), NOW),
        Err(WebhookError::MalformedHeader)
    );
}
