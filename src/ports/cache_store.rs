//! CacheStore port - shared key/value store with expiry and atomic counters.
//!
//! The rate limiter, usage accountant and read-through caches are all built on
//! this port. Across instances the store is the only coordination point, so
//! `increment` must be atomic in every implementation.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value that expires after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Atomically add one, creating the key at 1 if absent (with no expiry).
    ///
    /// Fails with `NotAnInteger` if the stored value is not numeric.
    async fn increment(&self, key: &str) -> Result<i64, CacheError>;

    /// Set the expiry of an existing key. Returns false if the key is absent.
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// Remaining time to live; `None` if the key is absent or never expires.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// Delete keys, returning how many existed.
    async fn delete(&self, keys: &[&str]) -> Result<u64, CacheError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("value at '{0}' is not an integer")]
    NotAnInteger(String),
}
