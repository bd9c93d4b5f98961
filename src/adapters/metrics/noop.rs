use crate::ports::PaywallMetrics;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl PaywallMetrics for NoopMetrics {
    fn payment_operation(&self, _operation: &str, _status: &str) {}

    fn paywall_check(&self, _result: &str) {}

    fn webhook_event(&self, _event_type: &str, _outcome: &str) {}

    fn webhook_queue_depth(&self, _depth: usize) {}

    fn breaker_transition(&self, _to_state: &str) {}
}
