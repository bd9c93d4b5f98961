//! In-memory cache store for tests and single-process development.
//!
//! Expiry is evaluated lazily against the injected clock, so tests can move
//! past a TTL by advancing a `ManualClock`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::{CacheError, CacheStore, Clock};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Timestamp>,
}

impl Entry {
    fn is_live(&self, now: Timestamp) -> bool {
        match self.expires_at {
            Some(at) => now.is_before(&at),
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryCacheStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCacheStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes the entry if it has expired, returning the live one otherwise.
    fn live_entry<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Timestamp,
    ) -> Option<&'a mut Entry> {
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        Ok(Self::live_entry(&mut entries, key, now).map(|e| e.value.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = self.clock.now();
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(now.plus_std(ttl)),
            },
        );
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64, CacheError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        match Self::live_entry(&mut entries, key, now) {
            Some(entry) => {
                let current: i64 = entry
                    .value
                    .parse()
                    .map_err(|_| CacheError::NotAnInteger(key.to_string()))?;
                let next = current + 1;
                entry.value = next.to_string();
                Ok(next)
            }
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: "1".to_string(),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        match Self::live_entry(&mut entries, key, now) {
            Some(entry) => {
                entry.expires_at = Some(now.plus_std(ttl));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        Ok(Self::live_entry(&mut entries, key, now)
            .and_then(|e| e.expires_at)
            .and_then(|at| at.duration_since(&now).to_std().ok()))
    }

    async fn delete(&self, keys: &[&str]) -> Result<u64, CacheError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = entries.remove(*key) {
                if entry.is_live(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;

    fn store() -> (InMemoryCacheStore, ManualClock) {
        let clock = ManualClock::new(Timestamp::from_unix_secs(1_700_000_000).unwrap());
        (InMemoryCacheStore::new(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn get_returns_none_for_absent_key() {
        let (store, _) = store();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_with_ttl_expires_after_ttl() {
        let (store, clock) = store();
        store
            .set_with_ttl("k", "v", Duration::from_secs(60))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(59));
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn increment_creates_key_without_expiry() {
        let (store, _) = store();
        assert_eq!(store.increment("c").await.unwrap(), 1);
        assert_eq!(store.increment("c").await.unwrap(), 2);
        assert_eq!(store.ttl("c").await.unwrap(), None);
    }

    #[tokio::test]
    async fn increment_preserves_existing_expiry() {
        let (store, clock) = store();
        store
            .set_with_ttl("c", "1", Duration::from_secs(60))
            .await
            .unwrap();
        store.increment("c").await.unwrap();

        clock.advance(Duration::from_secs(10));
        assert_eq!(store.ttl("c").await.unwrap(), Some(Duration::from_secs(50)));
    }

    #[tokio::test]
    async fn increment_rejects_non_numeric_value() {
        let (store, _) = store();
        store
            .set_with_ttl("c", "abc", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(matches!(
            store.increment("c").await,
            Err(CacheError::NotAnInteger(_))
        ));
    }

    #[tokio::test]
    async fn increment_after_expiry_starts_over() {
        let (store, clock) = store();
        store
            .set_with_ttl("c", "7", Duration::from_secs(1))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(2));
        assert_eq!(store.increment("c").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn set_expiry_reports_missing_key() {
        let (store, _) = store();
        assert!(!store.set_expiry("nope", Duration::from_secs(5)).await.unwrap());

        store.increment("yes").await.unwrap();
        assert!(store.set_expiry("yes", Duration::from_secs(5)).await.unwrap());
        assert_eq!(store.ttl("yes").await.unwrap(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn delete_counts_only_live_keys() {
        let (store, clock) = store();
        store
            .set_with_ttl("a", "1", Duration::from_secs(1))
            .await
            .unwrap();
        store
            .set_with_ttl("b", "1", Duration::from_secs(100))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(5));

        assert_eq!(store.delete(&["a", "b", "c"]).await.unwrap(), 1);
        assert!(store.is_empty().await);
    }
}
