//! PaywallMetrics port - observability collaborator injected into handlers.
//!
//! Keeps counters scoped to the service instance instead of process globals.

pub trait PaywallMetrics: Send + Sync {
    /// `payment_operations_total{operation, status}`
    fn payment_operation(&self, operation: &str, status: &str);

    /// `paywall_checks_total{result}`
    fn paywall_check(&self, result: &str);

    /// `webhook_events_total{event_type, outcome}`
    fn webhook_event(&self, event_type: &str, outcome: &str);

    /// `webhook_queue_depth`
    fn webhook_queue_depth(&self, depth: usize);

    /// `circuit_breaker_transitions_total{state}`
    fn breaker_transition(&self, to_state: &str);
}
