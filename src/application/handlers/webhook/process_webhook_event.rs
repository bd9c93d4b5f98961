//! ProcessWebhookEventHandler - Reacts to one stored webhook event.
//!
//! Runs on a worker, never on the delivering request. The stored copy is
//! re-read first so an event already marked processed is skipped; the
//! processed flag is the idempotency boundary.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::handlers::payment::transaction_cache_key;
use crate::domain::foundation::{Deadline, EventId};
use crate::domain::payment::TransactionStatus;
use crate::domain::webhook::{WebhookError, WebhookEvent, WebhookEventType};
use crate::ports::{CacheStore, Clock, PaywallMetrics, TransactionRepository, WebhookEventRepository};

/// What happens to an event whose reaction failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionFailurePolicy {
    /// Mark it processed anyway; the failure is only logged.
    #[default]
    MarkProcessed,
    /// Leave it unprocessed so the replayer retries it.
    LeaveUnprocessed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// A named reaction ran and the event is now processed.
    Processed,
    /// Unrecognized type; marked processed with no other change.
    Ignored,
    /// The stored event was already processed; nothing ran.
    AlreadyProcessed,
    /// The reaction failed; `marked` says whether the policy marked it processed.
    ReactionFailed { reason: String, marked: bool },
}

impl ProcessOutcome {
    fn metric_label(&self) -> &'static str {
        match self {
            ProcessOutcome::Processed => "processed",
            ProcessOutcome::Ignored => "ignored",
            ProcessOutcome::AlreadyProcessed => "already_processed",
            ProcessOutcome::ReactionFailed { .. } => "reaction_failed",
        }
    }
}

pub struct ProcessWebhookEventHandler {
    events: Arc<dyn WebhookEventRepository>,
    transactions: Arc<dyn TransactionRepository>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn PaywallMetrics>,
    policy: ReactionFailurePolicy,
    transaction_cache: Option<Arc<dyn CacheStore>>,
}

impl ProcessWebhookEventHandler {
    pub fn new(
        events: Arc<dyn WebhookEventRepository>,
        transactions: Arc<dyn TransactionRepository>,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn PaywallMetrics>,
    ) -> Self {
        Self {
            events,
            transactions,
            clock,
            metrics,
            policy: ReactionFailurePolicy::default(),
            transaction_cache: None,
        }
    }

    pub fn with_policy(mut self, policy: ReactionFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Evicts cached transaction records whose status a reaction changed.
    pub fn with_transaction_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.transaction_cache = Some(cache);
        self
    }

    pub async fn handle(
        &self,
        event_id: &EventId,
        deadline: Deadline,
    ) -> Result<ProcessOutcome, WebhookError> {
        let event = deadline
            .run(self.events.find_by_id(event_id))
            .await
            .map_err(|e| WebhookError::Storage(e.to_string()))?
            .map_err(|e| WebhookError::Storage(e.to_string()))?
            .ok_or_else(|| WebhookError::EventNotFound(event_id.clone()))?;

        let classification = event.classification();

        if event.processed {
            tracing::debug!(event_id = %event.id, "Webhook event already processed, skipping");
            self.metrics
                .webhook_event(classification.metric_label(), "already_processed");
            return Ok(ProcessOutcome::AlreadyProcessed);
        }

        let outcome = match self.react(&event, &classification, deadline).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "Webhook reaction failed"
                );
                ProcessOutcome::ReactionFailed {
                    reason: e.to_string(),
                    marked: self.policy == ReactionFailurePolicy::MarkProcessed,
                }
            }
        };

        let mark = !matches!(outcome, ProcessOutcome::ReactionFailed { marked: false, .. });
        if mark {
            deadline
                .run(self.events.mark_processed(&event.id, self.clock.now()))
                .await
                .map_err(|e| WebhookError::Storage(e.to_string()))?
                .map_err(|e| WebhookError::Storage(e.to_string()))?;
        }

        self.metrics
            .webhook_event(classification.metric_label(), outcome.metric_label());
        Ok(outcome)
    }

    async fn react(
        &self,
        event: &WebhookEvent,
        classification: &WebhookEventType,
        deadline: Deadline,
    ) -> Result<ProcessOutcome, WebhookError> {
        match classification {
            WebhookEventType::PaymentSucceeded => {
                self.settle(event, TransactionStatus::Completed, deadline).await?;
                tracing::info!(event_id = %event.id, "Payment succeeded");
                Ok(ProcessOutcome::Processed)
            }
            WebhookEventType::PaymentFailed => {
                self.settle(event, TransactionStatus::Failed, deadline).await?;
                tracing::info!(event_id = %event.id, "Payment failed");
                Ok(ProcessOutcome::Processed)
            }
            WebhookEventType::InvoicePaymentSucceeded => {
                let subscription = event
                    .data()
                    .pointer("/object/subscription")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                tracing::info!(
                    event_id = %event.id,
                    subscription,
                    "Invoice payment succeeded, renewal recorded"
                );
                Ok(ProcessOutcome::Processed)
            }
            WebhookEventType::Unknown(event_type) => {
                tracing::info!(event_id = %event.id, event_type = %event_type, "Unhandled webhook event type");
                Ok(ProcessOutcome::Ignored)
            }
        }
    }

    async fn settle(
        &self,
        event: &WebhookEvent,
        status: TransactionStatus,
        deadline: Deadline,
    ) -> Result<(), WebhookError> {
        let transaction_id = event
            .transaction_reference()
            .ok_or(WebhookError::MissingField("transaction_id"))
            .map_err(|e| WebhookError::Reaction(e.to_string()))?;

        let updated = deadline
            .run(
                self.transactions
                    .update_status(&transaction_id, status, self.clock.now()),
            )
            .await
            .map_err(|e| WebhookError::Reaction(e.to_string()))?
            .map_err(|e| WebhookError::Reaction(e.to_string()))?;

        if !updated {
            return Err(WebhookError::Reaction(format!(
                "transaction {} not found",
                transaction_id
            )));
        }

        if let Some(cache) = &self.transaction_cache {
            let key = transaction_cache_key(&transaction_id);
            if let Err(e) = cache.delete(&[key.as_str()]).await {
                tracing::warn!(key = %key, error = %e, "Failed to evict cached transaction");
            }
        }
        Ok(())
    }
}
