//! Error types for the webhook handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while receiving a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No webhook secret is configured.
    #[error("webhook handler is disabled")]
    Disabled,

    /// The X-Hub-Signature-256 header is missing.
    #[error("missing signature header")]
    MissingSignature,

    /// The signature header has an invalid format.
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// HMAC verification failed.
    #[error("invalid signature")]
    InvalidSignature,

    /// The X-GitHub-Event header is missing.
    #[error("missing event type header")]
    MissingEventType,

    /// The delivery was accepted but could not be processed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Disabled: 404 Not Found (hide the endpoint when disabled)
    /// - Missing/Invalid signature: 401 Unauthorized
    /// - Missing event type: 400 Bad Request
    /// - Internal: 500 Internal Server Error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Disabled => StatusCode::NOT_FOUND,
            Self::MissingSignature | Self::InvalidSignature | Self::InvalidSignatureFormat(_) => {
                StatusCode::UNAUTHORIZED
            },
            Self::MissingEventType => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        // Bodies are fixed strings; the error detail stays in the logs.
        let status = self.status_code();
        let body = match &self {
            Self::Disabled => "Not Found",
            Self::MissingSignature => "Missing signature",
            Self::InvalidSignatureFormat(_) => "Invalid signature format",
            Self::InvalidSignature => "Invalid signature",
            Self::MissingEventType => "Missing event type",
            Self::Internal(_) => "Internal server error",
        };

        (status, body).into_response()
    }
}
