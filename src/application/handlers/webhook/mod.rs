//! Webhook handlers.
//!
//! Ingestion acknowledges once the event is durable; processing happens
//! later on a worker, outside the delivering request.

mod ingest_webhook;
mod process_webhook_event;

pub use ingest_webhook::{IngestWebhookCommand, IngestWebhookHandler, WebhookAck};
pub use process_webhook_event::{
    ProcessOutcome, ProcessWebhookEventHandler, ReactionFailurePolicy,
};
