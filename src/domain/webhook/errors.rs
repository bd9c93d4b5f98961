//! Webhook error types.
//!
//! Status codes drive the gateway's redelivery behaviour: 2xx acknowledges,
//! 4xx is final, 5xx asks the gateway to try again.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::EventId;

#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header absent from the delivery.
    #[error("Missing signature")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Webhook event not found: {0}")]
    EventNotFound(EventId),

    /// A type-specific reaction could not be applied.
    #[error("Reaction failed: {0}")]
    Reaction(String),

    /// Durable store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Webhook verifier misconfigured: {0}")]
    Configuration(String),
}

impl WebhookError {
    /// Returns true if the gateway should redeliver this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Storage(_) | WebhookError::Reaction(_))
    }

    /// True for every variant the verifier produces on a bad signature.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => "INVALID_WEBHOOK_SIGNATURE",
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => "INVALID_WEBHOOK_PAYLOAD",
            WebhookError::EventNotFound(_) => "WEBHOOK_EVENT_NOT_FOUND",
            WebhookError::Reaction(_) => "WEBHOOK_REACTION_FAILED",
            WebhookError::Storage(_) => "STORAGE_ERROR",
            WebhookError::Configuration(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth failures - don't retry
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => StatusCode::UNAUTHORIZED,

            // Bad request - don't retry
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::EventNotFound(_) => StatusCode::NOT_FOUND,

            // Server errors - will retry
            WebhookError::Reaction(_)
            | WebhookError::Storage(_)
            | WebhookError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
