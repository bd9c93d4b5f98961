//! Payment processing errors with HTTP status mapping.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{TransactionId, ValidationError};

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Request was malformed; nothing was attempted.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Circuit breaker is open; the gateway was not called.
    #[error("Payment service temporarily unavailable")]
    ServiceUnavailable,

    /// The gateway refused, failed, or timed out.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl PaymentError {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Validation(_) => "VALIDATION_FAILED",
            PaymentError::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            PaymentError::Gateway(_) => "GATEWAY_ERROR",
            PaymentError::NotFound(_) => "TRANSACTION_NOT_FOUND",
            PaymentError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::ServiceUnavailable | PaymentError::Gateway(_) | PaymentError::Storage(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::Gateway(_) => StatusCode::BAD_GATEWAY,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
