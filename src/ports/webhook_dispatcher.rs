//! WebhookDispatcher port - hands a stored event to asynchronous processing.
//!
//! Dispatch returns as soon as the event is queued; the reaction runs later
//! on a worker with no caller to report to.

use async_trait::async_trait;

use crate::domain::foundation::EventId;

#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    async fn dispatch(&self, event_id: EventId) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Queue stayed full for the whole enqueue timeout.
    #[error("webhook queue is full")]
    QueueFull,

    /// Workers have shut down.
    #[error("webhook queue is closed")]
    Closed,
}
