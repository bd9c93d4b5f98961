//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Gateway URL must use HTTPS in production")]
    GatewayMustBeHttps,

    #[error("Invalid gateway URL format")]
    InvalidGatewayUrl,

    #[error("Failure percent must be between 0 and 100")]
    InvalidFailurePercent,

    #[error("Circuit breaker failure threshold must be at least 1")]
    InvalidFailureThreshold,

    #[error("Invalid {0}: must be greater than zero")]
    MustBePositive(&'static str),

    #[error("UTC offset must be within +/- 18 hours")]
    InvalidUtcOffset,
}
