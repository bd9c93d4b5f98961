//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (payments, webhook ingestion, enforcement) change state; queries
//! (transaction reads, access checks) only read it.

pub mod handlers;

pub use handlers::{
    // Payment handlers
    GetTransactionHandler, GetTransactionQuery, ProcessPaymentCommand, ProcessPaymentHandler,
    // Paywall handlers
    CheckAccessQuery, EnforcePaywallCommand, PaywallDecisionEngine,
    // Webhook handlers
    IngestWebhookCommand, IngestWebhookHandler, ProcessOutcome, ProcessWebhookEventHandler,
    ReactionFailurePolicy, WebhookAck,
};
