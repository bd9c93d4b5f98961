//! WebhookEventRepository port - durable store for inbound gateway events.
//!
//! The gateway may deliver the same event more than once (timeouts, 5xx
//! responses, lost acknowledgements). Implementations must use a database
//! constraint on the event id so concurrent duplicate deliveries resolve to
//! exactly one `Inserted`.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventId, Timestamp};
use crate::domain::webhook::WebhookEvent;

/// Result of attempting to save a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this event).
    Inserted,
    /// Record already exists (duplicate delivery).
    AlreadyExists,
}

#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Append a new event with `processed = false`.
    async fn save(&self, event: &WebhookEvent) -> Result<SaveResult, DomainError>;

    async fn find_by_id(&self, id: &EventId) -> Result<Option<WebhookEvent>, DomainError>;

    /// Set `processed = true` and stamp `processed_at`.
    ///
    /// Returns false if the event does not exist.
    async fn mark_processed(&self, id: &EventId, at: Timestamp) -> Result<bool, DomainError>;

    /// Unprocessed events received before `received_before`, oldest first.
    async fn find_unprocessed(
        &self,
        received_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<WebhookEvent>, DomainError>;
}
