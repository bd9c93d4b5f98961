//! Inbound gateway notification and its classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::foundation::{EventId, Timestamp, TransactionId};

use super::WebhookError;

/// Classification of the gateway event types this core reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WebhookEventType {
    PaymentSucceeded,
    PaymentFailed,
    InvoicePaymentSucceeded,
    /// Anything else; acknowledged and marked processed without a reaction.
    Unknown(String),
}

impl WebhookEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => WebhookEventType::PaymentSucceeded,
            "payment_intent.payment_failed" => WebhookEventType::PaymentFailed,
            "invoice.payment_succeeded" => WebhookEventType::InvoicePaymentSucceeded,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::PaymentSucceeded => "payment_intent.succeeded",
            WebhookEventType::PaymentFailed => "payment_intent.payment_failed",
            WebhookEventType::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            WebhookEventType::Unknown(s) => s,
        }
    }

    /// Bounded label for metrics; unknown types collapse to "unknown".
    pub fn metric_label(&self) -> &'static str {
        match self {
            WebhookEventType::PaymentSucceeded => "payment_succeeded",
            WebhookEventType::PaymentFailed => "payment_failed",
            WebhookEventType::InvoicePaymentSucceeded => "invoice_payment_succeeded",
            WebhookEventType::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound notification, as stored durably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: EventId,
    pub event_type: String,
    /// Full delivered document, with `id` filled in if it was generated.
    pub payload: Value,
    pub processed: bool,
    pub processed_at: Option<Timestamp>,
    pub received_at: Timestamp,
}

impl WebhookEvent {
    /// Parses a raw delivery body.
    ///
    /// The body must be a JSON object. A missing or empty `id` is replaced
    /// with a locally generated one; a missing `type` is stored as empty and
    /// classifies as unknown.
    pub fn from_delivery(body: &[u8], received_at: Timestamp) -> Result<Self, WebhookError> {
        let mut payload: Value =
            serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let object = payload
            .as_object_mut()
            .ok_or_else(|| WebhookError::ParseError("expected a JSON object".to_string()))?;

        let id = match object.get("id").and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => {
                EventId::new(id).map_err(|e| WebhookError::ParseError(e.to_string()))?
            }
            _ => {
                let generated = EventId::generate();
                object.insert("id".to_string(), Value::String(generated.to_string()));
                generated
            }
        };

        let event_type = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            id,
            event_type,
            payload,
            processed: false,
            processed_at: None,
            received_at,
        })
    }

    pub fn classification(&self) -> WebhookEventType {
        WebhookEventType::parse(&self.event_type)
    }

    /// The `data` section of the delivery, `Null` if absent.
    pub fn data(&self) -> &Value {
        self.payload.get("data").unwrap_or(&Value::Null)
    }

    /// Transaction this event refers to, if any.
    ///
    /// Looked up at `data.transaction_id`, then
    /// `data.object.metadata.transaction_id`.
    pub fn transaction_reference(&self) -> Option<TransactionId> {
        let data = self.data();
        data.get("transaction_id")
            .or_else(|| data.pointer("/object/metadata/transaction_id"))
            .and_then(Value::as_str)
            .and_then(|s| TransactionId::new(s).ok())
    }

    pub fn mark_processed(&mut self, at: Timestamp) {
        self.processed = true;
        self.processed_at = Some(at);
    }
}
