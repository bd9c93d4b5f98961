//! System-level failures of the decision engine.
//!
//! Business denials are verdicts, not errors; these only cover collaborators
//! that could not answer.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Error)]
pub enum PaywallError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Subscription lookup failed: {0}")]
    SubscriptionLookup(String),

    #[error("Rate limiter unavailable: {0}")]
    RateLimiter(String),

    #[error("Usage accounting unavailable: {0}")]
    Usage(String),

    #[error("Deadline exceeded during {0}")]
    Timeout(&'static str),
}

impl PaywallError {
    pub fn code(&self) -> &'static str {
        match self {
            PaywallError::Validation(_) => "VALIDATION_FAILED",
            PaywallError::SubscriptionLookup(_) => "SUBSCRIPTION_LOOKUP_FAILED",
            PaywallError::RateLimiter(_) => "RATE_LIMITER_UNAVAILABLE",
            PaywallError::Usage(_) => "USAGE_UNAVAILABLE",
            PaywallError::Timeout(_) => "TIMEOUT",
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, PaywallError::Validation(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PaywallError::Validation(_) => StatusCode::BAD_REQUEST,
            PaywallError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PaywallError::SubscriptionLookup(_)
            | PaywallError::RateLimiter(_)
            | PaywallError::Usage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
