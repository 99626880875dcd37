//! `x-line-signature` verification.
//!
//! The platform signs each webhook body with HMAC-SHA256 keyed by the channel secret and
//! sends the base64 digest in the `x-line-signature` header. Requests are rejected before
//! any handler runs unless the digest matches the raw body bytes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::RelayError;
use crate::util::AppState;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Webhook bodies above this size are rejected while buffering.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

type HmacSha256 = Hmac<Sha256>;

/// Base64-encoded HMAC-SHA256 of `body` keyed by `channel_secret`.
pub fn compute_signature(channel_secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length; new_from_slice cannot fail here.
    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            tracing::error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Check `signature` against the body in constant time.
pub fn validate_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Axum middleware: buffer the body, verify it, and hand the same bytes to the next handler.
pub async fn require_line_signature(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let signature = match parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => return RelayError::Signature("no signature".into()).into_response(),
    };

    let bytes: Bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            return RelayError::InvalidBody(format!("failed to read body: {e}")).into_response()
        }
    };

    if !validate_signature(&state.config.channel_secret, &bytes, &signature) {
        return RelayError::Signature("signature mismatch".into()).into_response();
    }

    tracing::debug!(bytes = bytes.len(), "webhook signature verified");
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
