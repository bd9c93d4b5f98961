//! Rate limiting port for per-subject request guards.
//!
//! Limits are counted per (subject, action) in fixed windows. The counter for
//! a window lives in the shared cache store and disappears when the window's
//! TTL expires.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::{Action, Timestamp, UserId};

/// Port for rate limiting operations.
///
/// Implementations should be thread-safe and support concurrent access.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if request is allowed, counting it if so.
    ///
    /// A denied request does not touch the counter.
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError>;

    /// Get current rate limit status without counting a request.
    async fn status(&self, key: &RateLimitKey) -> Result<RateLimitStatus, RateLimitError>;

    /// Clears the current window, restoring full quota.
    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitError>;
}

/// Key identifying what to rate limit.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub subject: UserId,
    pub action: Action,
}

impl RateLimitKey {
    pub fn new(subject: UserId, action: Action) -> Self {
        Self { subject, action }
    }

    /// Returns the cache key string for this rate limit key.
    pub fn to_cache_key(&self) -> String {
        format!("rate_limit:{}:{}", self.subject, self.action)
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject, self.action)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed; includes current status.
    Allowed(RateLimitStatus),
    /// Request is denied; includes denial details.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    /// Returns true if the request was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    /// Returns true if the request was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitResult::Denied(_))
    }
}

/// Current rate limit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Remaining requests in the current window.
    pub remaining: u32,
    /// When the current window resets.
    pub reset_at: Timestamp,
    /// Window duration in seconds.
    pub window_secs: u64,
}

/// Details of a rate limit denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDenied {
    pub limit: u32,
    /// Seconds until the client should retry.
    pub retry_after_secs: u64,
    pub message: String,
}

/// Errors that can occur during rate limiting operations.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Rate limiter backend is unavailable.
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RateLimitKey {
        RateLimitKey::new(UserId::new("user-123").unwrap(), Action::new("view").unwrap())
    }

    #[test]
    fn cache_key_format() {
        assert_eq!(key().to_cache_key(), "rate_limit:user-123:view");
    }

    #[test]
    fn display_joins_subject_and_action() {
        assert_eq!(key().to_string(), "user-123/view");
    }

    #[test]
    fn rate_limit_result_is_allowed_works() {
        let status = RateLimitStatus {
            limit: 10,
            remaining: 5,
            reset_at: Timestamp::now(),
            window_secs: 60,
        };
        let result = RateLimitResult::Allowed(status);
        assert!(result.is_allowed());
        assert!(!result.is_denied());
    }

    #[test]
    fn rate_limit_result_is_denied_works() {
        let denied = RateLimitDenied {
            limit: 10,
            retry_after_secs: 30,
            message: "Rate limit exceeded".to_string(),
        };
        let result = RateLimitResult::Denied(denied);
        assert!(result.is_denied());
        assert!(!result.is_allowed());
    }
}
