//! Daily usage counters.
//!
//! One counter per (subject, action). The counter is created by the first
//! increment of the day and expires at the next local midnight, so a new
//! day starts from zero without a sweeper.

use async_trait::async_trait;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{Action, UserId};
use crate::domain::paywall::UsageSnapshot;
use crate::ports::{usage_key, CacheError, CacheStore, Clock, UsageAccountant, UsageError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Calls per day before usage reads as exhausted.
    pub daily_limit: u64,
    /// Offset east of UTC, in seconds, at which the day rolls over.
    pub utc_offset_secs: i32,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            daily_limit: 100,
            utc_offset_secs: 0,
        }
    }
}

impl UsageConfig {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Clone)]
pub struct DailyUsageAccountant {
    store: Arc<dyn CacheStore>,
    config: UsageConfig,
    clock: Arc<dyn Clock>,
}

impl DailyUsageAccountant {
    pub fn new(store: Arc<dyn CacheStore>, config: UsageConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn daily_limit(&self) -> u64 {
        self.config.daily_limit
    }

    fn until_rollover(&self) -> Duration {
        let now = self.clock.now();
        let boundary = now.next_day_boundary(self.config.offset());
        boundary
            .duration_since(&now)
            .to_std()
            .unwrap_or(Duration::from_secs(1))
            .max(Duration::from_secs(1))
    }
}

fn unavailable(e: CacheError) -> UsageError {
    UsageError::Unavailable(e.to_string())
}

#[async_trait]
impl UsageAccountant for DailyUsageAccountant {
    async fn status(&self, subject: &UserId, action: &Action) -> Result<UsageSnapshot, UsageError> {
        let current = self
            .store
            .get(&usage_key(subject, action))
            .await
            .map_err(unavailable)?
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Ok(UsageSnapshot::new(current, self.config.daily_limit))
    }

    async fn increment(&self, subject: &UserId, action: &Action) -> Result<u64, UsageError> {
        let key = usage_key(subject, action);

        let next = match self.store.increment(&key).await {
            Ok(next) => next.max(1) as u64,
            Err(CacheError::NotAnInteger(_)) => {
                tracing::warn!(key = %key, "Corrupt usage counter, restarting day");
                self.store
                    .set_with_ttl(&key, "1", self.until_rollover())
                    .await
                    .map_err(unavailable)?;
                return Ok(1);
            }
            Err(e) => return Err(unavailable(e)),
        };

        if next == 1 {
            self.store
                .set_expiry(&key, self.until_rollover())
                .await
                .map_err(unavailable)?;
        }
        Ok(next)
    }
}

impl std::fmt::Debug for DailyUsageAccountant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyUsageAccountant")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
