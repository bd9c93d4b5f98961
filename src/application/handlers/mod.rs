//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod payment;
pub mod paywall;
pub mod webhook;

pub use payment::{
    GetTransactionHandler, GetTransactionQuery, ProcessPaymentCommand, ProcessPaymentHandler,
};
pub use paywall::{CheckAccessQuery, EnforcePaywallCommand, PaywallDecisionEngine};
pub use webhook::{
    IngestWebhookCommand, IngestWebhookHandler, ProcessOutcome, ProcessWebhookEventHandler,
    ReactionFailurePolicy, WebhookAck,
};
