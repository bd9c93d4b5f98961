//! Paywall configuration: rate limit, daily quota and access cache.

use chrono::Local;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::rate_limiter::RateLimitConfig;
use crate::adapters::usage::UsageConfig;

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct PaywallConfig {
    /// Requests per window for each (subject, action)
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: u32,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    /// Uses per day before usage reads as exhausted
    #[serde(default = "default_daily_limit")]
    pub daily_usage_limit: u64,

    #[serde(default = "default_access_cache_ttl")]
    pub access_cache_ttl_secs: u64,

    /// Offset east of UTC at which the usage day rolls over; server-local when absent
    #[serde(default)]
    pub usage_utc_offset_minutes: Option<i32>,
}

impl PaywallConfig {
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::new(self.rate_limit_requests, self.rate_limit_window_secs)
    }

    pub fn usage(&self) -> UsageConfig {
        let utc_offset_secs = match self.usage_utc_offset_minutes {
            Some(minutes) => minutes * 60,
            None => Local::now().offset().local_minus_utc(),
        };
        UsageConfig {
            daily_limit: self.daily_usage_limit,
            utc_offset_secs,
        }
    }

    pub fn access_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.access_cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rate_limit_requests == 0 {
            return Err(ValidationError::MustBePositive("rate limit requests"));
        }
        if self.rate_limit_window_secs == 0 {
            return Err(ValidationError::MustBePositive("rate limit window"));
        }
        if self.daily_usage_limit == 0 {
            return Err(ValidationError::MustBePositive("daily usage limit"));
        }
        if self.access_cache_ttl_secs == 0 {
            return Err(ValidationError::MustBePositive("access cache TTL"));
        }
        if let Some(minutes) = self.usage_utc_offset_minutes {
            if minutes.abs() > MAX_OFFSET_MINUTES {
                return Err(ValidationError::InvalidUtcOffset);
            }
        }
        Ok(())
    }
}

impl Default for PaywallConfig {
    fn default() -> Self {
        Self {
            rate_limit_requests: default_rate_limit_requests(),
            rate_limit_window_secs: default_rate_limit_window(),
            daily_usage_limit: default_daily_limit(),
            access_cache_ttl_secs: default_access_cache_ttl(),
            usage_utc_offset_minutes: None,
        }
    }
}

fn default_rate_limit_requests() -> u32 {
    10
}

fn default_rate_limit_window() -> u64 {
    60
}

fn default_daily_limit() -> u64 {
    100
}

fn default_access_cache_ttl() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PaywallConfig::default();
        assert_eq!(config.rate_limit(), RateLimitConfig::new(10, 60));
        assert_eq!(config.usage().daily_limit, 100);
        assert_eq!(config.access_cache_ttl(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_offset_converts_to_seconds() {
        let config = PaywallConfig {
            usage_utc_offset_minutes: Some(-330),
            ..Default::default()
        };
        assert_eq!(config.usage().utc_offset_secs, -330 * 60);
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        let config = PaywallConfig {
            usage_utc_offset_minutes: Some(19 * 60),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUtcOffset));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = PaywallConfig {
            rate_limit_window_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
