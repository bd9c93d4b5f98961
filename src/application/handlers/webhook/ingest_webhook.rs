//! IngestWebhookHandler - Command handler for inbound gateway deliveries.
//!
//! 1. Verify authenticity; a failure writes nothing.
//! 2. Parse and store the event unprocessed; a store failure is returned so
//!    the gateway retries the delivery.
//! 3. Hand the event to the dispatcher and acknowledge without waiting for
//!    the reaction. A dispatch failure leaves the event unprocessed for the
//!    replayer and does not fail the acknowledgement.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{Deadline, EventId};
use crate::domain::webhook::{WebhookError, WebhookEvent};
use crate::ports::{
    Clock, PaywallMetrics, RawWebhookRequest, SaveResult, WebhookDispatcher,
    WebhookEventRepository, WebhookVerifier,
};

#[derive(Debug, Clone)]
pub struct IngestWebhookCommand {
    pub request: RawWebhookRequest,
    pub deadline: Deadline,
}

/// Acknowledgement returned to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub event_id: EventId,
    /// True when this event id had already been stored.
    pub duplicate: bool,
}

pub struct IngestWebhookHandler {
    verifier: Arc<dyn WebhookVerifier>,
    events: Arc<dyn WebhookEventRepository>,
    dispatcher: Arc<dyn WebhookDispatcher>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn PaywallMetrics>,
}

impl IngestWebhookHandler {
    pub fn new(
        verifier: Arc<dyn WebhookVerifier>,
        events: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<dyn WebhookDispatcher>,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn PaywallMetrics>,
    ) -> Self {
        Self {
            verifier,
            events,
            dispatcher,
            clock,
            metrics,
        }
    }

    pub async fn handle(&self, cmd: IngestWebhookCommand) -> Result<WebhookAck, WebhookError> {
        if let Err(e) = self.verifier.verify(&cmd.request) {
            tracing::warn!(error = %e, "Rejected webhook delivery");
            self.metrics.webhook_event("unknown", "rejected");
            return Err(e);
        }

        let event = match WebhookEvent::from_delivery(&cmd.request.body, self.clock.now()) {
            Ok(event) => event,
            Err(e) => {
                self.metrics.webhook_event("unknown", "invalid");
                return Err(e);
            }
        };
        let label = event.classification().metric_label();

        let saved = cmd
            .deadline
            .run(self.events.save(&event))
            .await
            .map_err(|e| WebhookError::Storage(e.to_string()))
            .and_then(|r| r.map_err(|e| WebhookError::Storage(e.to_string())));

        let saved = match saved {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Failed to store webhook event");
                self.metrics.webhook_event(label, "store_failed");
                return Err(e);
            }
        };

        if saved == SaveResult::AlreadyExists {
            tracing::info!(event_id = %event.id, "Duplicate webhook delivery acknowledged");
            self.metrics.webhook_event(label, "duplicate");
            return Ok(WebhookAck {
                event_id: event.id,
                duplicate: true,
            });
        }

        match self.dispatcher.dispatch(event.id.clone()).await {
            Ok(()) => self.metrics.webhook_event(label, "accepted"),
            Err(e) => {
                tracing::warn!(
                    event_id = %event.id,
                    error = %e,
                    "Webhook event stored but not dispatched, leaving for replay"
                );
                self.metrics.webhook_event(label, "deferred");
            }
        }

        tracing::info!(event_id = %event.id, event_type = %event.event_type, "Webhook event received");
        Ok(WebhookAck {
            event_id: event.id,
            duplicate: false,
        })
    }
}
