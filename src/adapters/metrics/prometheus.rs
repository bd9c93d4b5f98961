//! Prometheus metrics sink.
//!
//! Each instance owns its registry, so tests and multiple engines in one
//! process never collide on metric names.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::ports::PaywallMetrics;

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("metrics output is not valid UTF-8")]
    Encoding,
}

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    payment_operations: IntCounterVec,
    paywall_checks: IntCounterVec,
    webhook_events: IntCounterVec,
    webhook_queue_depth: IntGauge,
    breaker_transitions: IntCounterVec,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let payment_operations = IntCounterVec::new(
            Opts::new("payment_operations_total", "Payment operations by outcome"),
            &["operation", "status"],
        )?;
        let paywall_checks = IntCounterVec::new(
            Opts::new("paywall_checks_total", "Paywall decisions by result"),
            &["result"],
        )?;
        let webhook_events = IntCounterVec::new(
            Opts::new("webhook_events_total", "Webhook deliveries by type and outcome"),
            &["event_type", "outcome"],
        )?;
        let webhook_queue_depth = IntGauge::new(
            "webhook_queue_depth",
            "Webhook events waiting for a worker",
        )?;
        let breaker_transitions = IntCounterVec::new(
            Opts::new(
                "circuit_breaker_transitions_total",
                "Circuit breaker transitions by target state",
            ),
            &["state"],
        )?;

        registry.register(Box::new(payment_operations.clone()))?;
        registry.register(Box::new(paywall_checks.clone()))?;
        registry.register(Box::new(webhook_events.clone()))?;
        registry.register(Box::new(webhook_queue_depth.clone()))?;
        registry.register(Box::new(breaker_transitions.clone()))?;

        Ok(Self {
            registry,
            payment_operations,
            paywall_checks,
            webhook_events,
            webhook_queue_depth,
            breaker_transitions,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition format, version 0.0.4.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|_| MetricsError::Encoding)
    }
}

impl PaywallMetrics for PrometheusMetrics {
    fn payment_operation(&self, operation: &str, status: &str) {
        self.payment_operations
            .with_label_values(&[operation, status])
            .inc();
    }

    fn paywall_check(&self, result: &str) {
        self.paywall_checks.with_label_values(&[result]).inc();
    }

    fn webhook_event(&self, event_type: &str, outcome: &str) {
        self.webhook_events
            .with_label_values(&[event_type, outcome])
            .inc();
    }

    fn webhook_queue_depth(&self, depth: usize) {
        self.webhook_queue_depth
            .set(i64::try_from(depth).unwrap_or(i64::MAX));
    }

    fn breaker_transition(&self, to_state: &str) {
        self.breaker_transitions.with_label_values(&[to_state]).inc();
    }
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}
