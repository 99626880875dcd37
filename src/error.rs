use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::util::error_response;

/// Failures that can occur while relaying a webhook batch.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or malformed environment configuration (start-up only).
    #[error("configuration error: {0}")]
    Config(String),

    /// The `x-line-signature` header was absent or did not match the body.
    #[error("signature validation failed: {0}")]
    Signature(String),

    /// The verified request body is not a webhook payload.
    #[error("invalid webhook body: {0}")]
    InvalidBody(String),

    /// Transport error, non-success status, or empty choice list from the completion API.
    #[error("completion request failed: {0}")]
    Completion(String),

    /// Transport error or non-success status from the reply endpoint.
    #[error("reply request failed: {0}")]
    Reply(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Signature(_) => StatusCode::UNAUTHORIZED,
            RelayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RelayError::Config(_) | RelayError::Completion(_) | RelayError::Reply(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // Logged where the batch failed; the caller only sees the status.
            return status.into_response();
        }
        tracing::warn!(error = %self, status = %status, "webhook rejected");
        error_response(status, &self.to_string())
    }
}
