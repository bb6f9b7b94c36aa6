//! Webhook signature checking.
//!
//! The gateway signs notifications with `sha512(order_id + status_code + gross_amount + server_key)` and sends
//! the hex digest in the `signature_key` field.

use checkout_engine::GatewayClientError;
use serde_json::Value;
use sha2::{Digest, Sha512};

/// Compute the signature the gateway would attach to a notification with these fields.
pub fn signature_for(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check the `signature_key` carried by a notification payload against the server key.
pub fn verify_payload_signature(payload: &Value, server_key: &str) -> Result<(), GatewayClientError> {
    let field = |name: &str| {
        payload
            .get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| GatewayClientError::VerificationFailed(format!("notification is missing {name}")))
    };
    let order_id = field("order_id")?;
    let status_code = field("status_code")?;
    let gross_amount = field("gross_amount")?;
    let claimed = field("signature_key")?;
    let expected = signature_for(order_id, status_code, gross_amount, server_key);
    if claimed.eq_ignore_ascii_case(&expected) {
        Ok(())
    } else {
        Err(GatewayClientError::VerificationFailed("signature mismatch".to_string()))
    }
}
