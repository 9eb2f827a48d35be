//! # Gateway signature schemes
//!
//! The payment gateway authenticates its confirmations with HMAC-SHA256, rendered as lowercase
//! hexadecimal. Two independent schemes are in play, keyed with *different* secrets:
//!
//! * **Webhook path**: the MAC is computed over the exact raw bytes of the webhook request body,
//!   using the webhook secret. The body must be captured before any JSON parsing; re-serialising
//!   the parsed value can change the byte content and invalidate the signature.
//! * **Client path**: the checkout widget hands the browser a signature over the ASCII string
//!   `"{order_id}|{payment_id}"`, computed with the API key secret.
//!
//! Verification compares digests in constant time. A short-circuiting string compare would be a
//! timing oracle on a financial integrity boundary.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

fn hmac_hex(secret: &str, data: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

fn matches_constant_time(expected: &str, supplied: &str) -> bool {
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}

/// Compute the webhook-path signature over the raw request body.
pub fn sign_webhook_payload(raw_body: &[u8], webhook_secret: &str) -> String {
    hmac_hex(webhook_secret, raw_body)
}

/// Verify a webhook-path signature against the raw request body.
pub fn verify_webhook_signature(raw_body: &[u8], signature: &str, webhook_secret: &str) -> bool {
    matches_constant_time(&sign_webhook_payload(raw_body, webhook_secret), signature)
}

/// The message the client-path signature is computed over.
pub fn client_signature_message(gateway_order_id: &str, gateway_payment_id: &str) -> String {
    format!("{gateway_order_id}|{gateway_payment_id}")
}

/// Compute the client-path signature for an order/payment id pair.
pub fn sign_client_payment(gateway_order_id: &str, gateway_payment_id: &str, key_secret: &str) -> String {
    hmac_hex(key_secret, client_signature_message(gateway_order_id, gateway_payment_id).as_bytes())
}

/// Verify the signature handed to the browser by the checkout widget.
pub fn verify_client_signature(
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> bool {
    matches_constant_time(&sign_client_payment(gateway_order_id, gateway_payment_id, key_secret), signature)
}
