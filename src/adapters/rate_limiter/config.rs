//! Fixed-window rate limit configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limit applied to every (subject, action) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted calls per window.
    pub requests_per_window: u32,
    /// Window length in seconds, measured from the first call.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 10,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_window: u32, window_secs: u64) -> Self {
        Self {
            requests_per_window: requests_per_window.max(1),
            window_secs: window_secs.max(1),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_per_minute() {
        let config = RateLimitConfig::default();
        assert_eq!(config.requests_per_window, 10);
        assert_eq!(config.window(), Duration::from_secs(60));
    }

    #[test]
    fn new_clamps_zero_values() {
        let config = RateLimitConfig::new(0, 0);
        assert_eq!(config.requests_per_window, 1);
        assert_eq!(config.window_secs, 1);
    }
}
