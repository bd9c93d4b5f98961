//! Shared application state for the HTTP routes.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::metrics::PrometheusMetrics;
use crate::application::handlers::{
    GetTransactionHandler, IngestWebhookHandler, PaywallDecisionEngine, ProcessPaymentHandler,
};
use crate::domain::foundation::Deadline;

/// Handlers are built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub process_payment: Arc<ProcessPaymentHandler>,
    pub get_transaction: Arc<GetTransactionHandler>,
    pub ingest_webhook: Arc<IngestWebhookHandler>,
    pub paywall: Arc<PaywallDecisionEngine>,
    /// Absent when metrics are disabled; `/metrics` then returns 404.
    pub prometheus: Option<Arc<PrometheusMetrics>>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Deadline for a request arriving now.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }
}
