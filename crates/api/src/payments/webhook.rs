//! Webhook signature verification and event decoding.
//!
//! The processor signs each delivery with HMAC-SHA256 over
//! `"{timestamp}.{raw_body}"` and sends the result in the signature header
//! as `t=<unix>,v1=<hex>` (possibly with several `v1` entries during secret
//! rotation). Verification is constant-time via [`Mac::verify_slice`] and
//! rejects stale timestamps to blunt replay of captured deliveries.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum allowed age (seconds) of a delivery's signed timestamp.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Event type for a completed checkout (the purchase-confirmation signal).
pub const EVENT_CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Event type for a failed payment (logged, never written to the ledger).
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Compute the hex HMAC-SHA256 signature for a timestamped payload.
///
/// This is the processor's side of the scheme; it lives here so tests and
/// local tooling can produce valid signature headers.
pub fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mac = signed_payload_mac(secret, timestamp, body);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a full signature header value for a timestamped payload.
pub fn signature_header(secret: &str, timestamp: i64, body: &[u8]) -> String {
    format!("t={timestamp},v1={}", compute_signature(secret, timestamp, body))
}

/// Verify a signature header against the raw request body.
///
/// Accepts the delivery when any `v1` entry matches and the signed timestamp
/// is within `tolerance_secs` of `now_unix`. Comparison is constant-time.
pub fn verify_signature(
    secret: &str,
    header: &str,
    body: &[u8],
    now_unix: i64,
    tolerance_secs: i64,
) -> Result<(), PaymentError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = value.parse().ok();
            }
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| PaymentError::InvalidSignature("missing or malformed timestamp".into()))?;
    if candidates.is_empty() {
        return Err(PaymentError::InvalidSignature("no v1 signature present".into()));
    }

    if (now_unix - timestamp).abs() > tolerance_secs {
        return Err(PaymentError::InvalidSignature(
            "timestamp outside tolerance".into(),
        ));
    }

    for candidate in candidates {
        let Ok(bytes) = hex::decode(candidate) else {
            continue;
        };
        let mac = signed_payload_mac(secret, timestamp, body);
        if mac.verify_slice(&bytes).is_ok() {
            return Ok(());
        }
    }

    Err(PaymentError::InvalidSignature(
        "no signature matched".into(),
    ))
}

/// HMAC over the signed payload `"{timestamp}.{body}"`.
fn signed_payload_mac(secret: &str, timestamp: i64, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac
}

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

/// Envelope of every webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// Processor event id (for log correlation).
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

/// The `data` member of a webhook event.
#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    /// The event's subject, shaped per event type.
    pub object: serde_json::Value,
}

/// Subject of a `checkout.session.completed` event.
#[derive(Debug, Deserialize)]
pub struct CompletedCheckoutSession {
    pub id: String,
    /// Payment reference, kept on the purchase row for audit.
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: CheckoutMetadata,
}

/// Metadata we attached when creating the session.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutMetadata {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string; fails on odd length or non-hex characters.
    pub fn decode(s: &str) -> Result<Vec<u8>, ()> {
        if s.len() % 2 != 0 {
            return Err(());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
