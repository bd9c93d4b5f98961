//! Payment configuration
//!
//! Without a gateway URL the simulated gateway is used.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::CircuitBreakerConfig;

/// Payment gateway, webhook secret and circuit breaker settings
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Base URL of the payment gateway API
    #[serde(default)]
    pub gateway_url: Option<String>,

    /// Bearer key for the gateway API
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Shared secret for webhook signatures
    #[serde(default)]
    pub webhook_secret: Option<SecretString>,

    /// Per-call gateway timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,

    /// Simulated gateway latency in milliseconds
    #[serde(default = "default_simulated_latency")]
    pub simulated_latency_ms: u64,

    /// Simulated gateway failure rate, 0 to 100
    #[serde(default = "default_simulated_failure_percent")]
    pub simulated_failure_percent: u8,

    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,
}

/// Circuit breaker guarding the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerSettings {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    #[serde(default = "default_recovery_timeout")]
    pub recovery_timeout_secs: u64,

    /// Trial calls admitted while half-open; unlimited when absent
    #[serde(default)]
    pub half_open_trial_count: Option<u32>,
}

impl CircuitBreakerSettings {
    pub fn to_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::for_payment_gateway()
            .with_failure_threshold(self.failure_threshold)
            .with_recovery_timeout(Duration::from_secs(self.recovery_timeout_secs))
            .with_half_open_trial_count(self.half_open_trial_count)
    }
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_secs: default_recovery_timeout(),
            half_open_trial_count: None,
        }
    }
}

impl PaymentConfig {
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// True when a real gateway is configured.
    pub fn uses_http_gateway(&self) -> bool {
        self.gateway_url.is_some()
    }

    /// Webhook secret, ignoring an empty value.
    pub fn webhook_secret(&self) -> Option<&SecretString> {
        self.webhook_secret
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())
    }

    /// Validate payment configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if let Some(url) = &self.gateway_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidGatewayUrl);
            }
            if production && !url.starts_with("https://") {
                return Err(ValidationError::GatewayMustBeHttps);
            }
            if self.api_key.is_none() {
                return Err(ValidationError::MissingRequired("PAYMENT__API_KEY"));
            }
        }
        if production && self.webhook_secret().is_none() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        if self.gateway_timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("gateway timeout"));
        }
        if self.simulated_failure_percent > 100 {
            return Err(ValidationError::InvalidFailurePercent);
        }
        if self.circuit_breaker.failure_threshold == 0 {
            return Err(ValidationError::InvalidFailureThreshold);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            api_key: None,
            webhook_secret: None,
            gateway_timeout_secs: default_gateway_timeout(),
            simulated_latency_ms: default_simulated_latency(),
            simulated_failure_percent: default_simulated_failure_percent(),
            circuit_breaker: CircuitBreakerSettings::default(),
        }
    }
}

fn default_gateway_timeout() -> u64 {
    30
}

fn default_simulated_latency() -> u64 {
    100
}

fn default_simulated_failure_percent() -> u8 {
    5
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_recovery_timeout() -> u64 {
    60
}
