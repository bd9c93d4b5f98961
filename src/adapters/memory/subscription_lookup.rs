//! In-memory subscription lookup.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::paywall::SubscriptionSnapshot;
use crate::ports::SubscriptionLookup;

/// Holds at most one subscription per subject, the one the lookup returns.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionLookup {
    subscriptions: Arc<RwLock<HashMap<UserId, SubscriptionSnapshot>>>,
    failing: Arc<AtomicBool>,
}

impl InMemorySubscriptionLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, subject: UserId, subscription: SubscriptionSnapshot) {
        self.subscriptions.write().await.insert(subject, subscription);
    }

    pub async fn remove(&self, subject: &UserId) {
        self.subscriptions.write().await.remove(subject);
    }

    /// While set, every lookup fails with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriptionLookup for InMemorySubscriptionLookup {
    async fn active_subscription_for(
        &self,
        subject: &UserId,
    ) -> Result<Option<SubscriptionSnapshot>, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::database("subscription store unavailable"));
        }
        Ok(self.subscriptions.read().await.get(subject).cloned())
    }
}
