//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PAYWALL` prefix and
//! nested values are separated by double underscores. Every section has
//! defaults, so an empty environment yields a runnable in-memory setup.
//!
//! # Example
//!
//! ```no_run
//! use paywall_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod payment;
mod paywall;
mod redis;
mod server;
mod webhook;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::{CircuitBreakerSettings, PaymentConfig};
pub use paywall::PaywallConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use webhook::WebhookConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection; in-memory stores when no URL is set
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Redis cache; in-memory cache when no URL is set
    #[serde(default)]
    pub redis: RedisConfig,

    /// Gateway, webhook secret and circuit breaker
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Webhook worker pool and replay
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Rate limit, daily quota and access cache
    #[serde(default)]
    pub paywall: PaywallConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `PAYWALL__*` variables.
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYWALL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAYWALL__PAYMENT__CIRCUIT_BREAKER__FAILURE_THRESHOLD=3`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYWALL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let production = self.is_production();
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.payment.validate(production)?;
        self.webhook.validate()?;
        self.paywall.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
