//! Fixed-window rate limiter over a `CacheStore`.
//!
//! The first call in a window writes the counter with the window TTL. Later
//! calls increment it until the limit is reached, after which calls are
//! denied until the key expires. The read and the increment are separate
//! store calls, so concurrent callers near the limit can overshoot it.

use async_trait::async_trait;
use std::sync::Arc;

use super::config::RateLimitConfig;
use crate::ports::{
    CacheError, CacheStore, Clock, RateLimitDenied, RateLimitError, RateLimitKey,
    RateLimitResult, RateLimitStatus, RateLimiter,
};

#[derive(Clone)]
pub struct FixedWindowRateLimiter {
    store: Arc<dyn CacheStore>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl FixedWindowRateLimiter {
    pub fn new(store: Arc<dyn CacheStore>, config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    async fn seconds_until_reset(&self, cache_key: &str) -> Result<u64, RateLimitError> {
        let ttl = self.store.ttl(cache_key).await.map_err(unavailable)?;
        Ok(ttl
            .map(|d| d.as_secs().max(1))
            .unwrap_or(self.config.window_secs))
    }

    fn status_with(&self, count: u64, reset_secs: u64) -> RateLimitStatus {
        let limit = self.config.requests_per_window;
        let used = u32::try_from(count).unwrap_or(u32::MAX);
        RateLimitStatus {
            limit,
            remaining: limit.saturating_sub(used),
            reset_at: self.clock.now().plus_secs(reset_secs as i64),
            window_secs: self.config.window_secs,
        }
    }

    async fn start_window(&self, cache_key: &str) -> Result<RateLimitResult, RateLimitError> {
        self.store
            .set_with_ttl(cache_key, "1", self.config.window())
            .await
            .map_err(unavailable)?;
        Ok(RateLimitResult::Allowed(
            self.status_with(1, self.config.window_secs),
        ))
    }
}

fn unavailable(e: CacheError) -> RateLimitError {
    RateLimitError::Unavailable(e.to_string())
}

#[async_trait]
impl RateLimiter for FixedWindowRateLimiter {
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let cache_key = key.to_cache_key();

        let raw = match self.store.get(&cache_key).await.map_err(unavailable)? {
            Some(raw) => raw,
            None => return self.start_window(&cache_key).await,
        };

        let count: u64 = match raw.trim().parse() {
            Ok(count) => count,
            Err(_) => {
                tracing::warn!(key = %key, value = %raw, "Corrupt rate limit counter, restarting window");
                return self.start_window(&cache_key).await;
            }
        };

        let limit = self.config.requests_per_window;
        if count >= u64::from(limit) {
            let retry_after_secs = self.seconds_until_reset(&cache_key).await?;
            tracing::debug!(key = %key, count, limit, retry_after_secs, "Rate limit exceeded");
            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit,
                retry_after_secs,
                message: "Rate limit exceeded".to_string(),
            }));
        }

        let next = match self.store.increment(&cache_key).await {
            Ok(next) => next.max(1) as u64,
            // Expired between the read and the increment; the new key has no TTL.
            Err(CacheError::NotAnInteger(_)) => return self.start_window(&cache_key).await,
            Err(e) => return Err(unavailable(e)),
        };
        if next == 1 {
            self.store
                .set_expiry(&cache_key, self.config.window())
                .await
                .map_err(unavailable)?;
        }

        let reset_secs = self.seconds_until_reset(&cache_key).await?;
        Ok(RateLimitResult::Allowed(self.status_with(next, reset_secs)))
    }

    async fn status(&self, key: &RateLimitKey) -> Result<RateLimitStatus, RateLimitError> {
        let cache_key = key.to_cache_key();
        let count = self
            .store
            .get(&cache_key)
            .await
            .map_err(unavailable)?
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let reset_secs = self.seconds_until_reset(&cache_key).await?;
        Ok(self.status_with(count, reset_secs))
    }

    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitError> {
        self.store
            .delete(&[key.to_cache_key().as_str()])
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

impl std::fmt::Debug for FixedWindowRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedWindowRateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
