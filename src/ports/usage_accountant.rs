//! UsageAccountant port - daily usage counters per (subject, action).
//!
//! `status` never mutates. `increment` is only called after the caller has
//! already decided to allow the usage, so the quota is reported rather than
//! enforced here.

use async_trait::async_trait;

use crate::domain::foundation::{Action, UserId};
use crate::domain::paywall::UsageSnapshot;

#[async_trait]
pub trait UsageAccountant: Send + Sync {
    /// Current count for today, defaulting to zero.
    async fn status(&self, subject: &UserId, action: &Action) -> Result<UsageSnapshot, UsageError>;

    /// Count one use. Returns the new count.
    async fn increment(&self, subject: &UserId, action: &Action) -> Result<u64, UsageError>;
}

/// Cache key for a usage counter.
pub fn usage_key(subject: &UserId, action: &Action) -> String {
    format!("usage:{}:{}", subject, action)
}

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("usage store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_key_format() {
        let key = usage_key(&UserId::new("u1").unwrap(), &Action::new("view").unwrap());
        assert_eq!(key, "usage:u1:view");
    }
}
