//! In-memory webhook event store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EventId, Timestamp};
use crate::domain::webhook::WebhookEvent;
use crate::ports::{SaveResult, WebhookEventRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemoryWebhookEventRepository {
    events: Arc<RwLock<HashMap<EventId, WebhookEvent>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::database("webhook event store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn save(&self, event: &WebhookEvent) -> Result<SaveResult, DomainError> {
        self.check_available()?;
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Ok(SaveResult::AlreadyExists);
        }
        events.insert(event.id.clone(), event.clone());
        Ok(SaveResult::Inserted)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<WebhookEvent>, DomainError> {
        self.check_available()?;
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn mark_processed(&self, id: &EventId, at: Timestamp) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut events = self.events.write().await;
        match events.get_mut(id) {
            Some(event) => {
                event.mark_processed(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_unprocessed(
        &self,
        received_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<WebhookEvent>, DomainError> {
        self.check_available()?;
        let events = self.events.read().await;
        let mut pending: Vec<WebhookEvent> = events
            .values()
            .filter(|e| !e.processed && e.received_at.is_before(&received_before))
            .cloned()
            .collect();
        pending.sort_by_key(|e| e.received_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }
}
