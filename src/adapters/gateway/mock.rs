//! Scripted gateway for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::foundation::TransactionId;
use crate::domain::payment::ChargeRequest;
use crate::ports::{ChargeOutcome, GatewayClient, GatewayError};

/// Replays queued outcomes in order, then succeeds.
///
/// # Example
///
/// ```ignore
/// let gateway = MockGatewayClient::new();
/// gateway.push_failure(GatewayError::Transport("down".into()));
/// let result = gateway.charge(&charge).await; // Err(Transport)
/// let result = gateway.charge(&charge).await; // Ok(completed)
/// assert_eq!(gateway.call_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockGatewayClient {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    scripted: VecDeque<Result<ChargeOutcome, GatewayError>>,
    calls: Vec<ChargeRequest>,
    delay: Option<Duration>,
}

impl MockGatewayClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push_outcome(&self, outcome: Result<ChargeOutcome, GatewayError>) {
        self.state().scripted.push_back(outcome);
    }

    pub fn push_failure(&self, error: GatewayError) {
        self.push_outcome(Err(error));
    }

    pub fn push_status(&self, status: &str) {
        self.push_outcome(Ok(ChargeOutcome {
            transaction_id: TransactionId::generate(),
            status: status.to_string(),
            gateway_reference: None,
        }));
    }

    /// Every call sleeps this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    pub fn calls(&self) -> Vec<ChargeRequest> {
        self.state().calls.clone()
    }
}

#[async_trait]
impl GatewayClient for MockGatewayClient {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        let (next, delay) = {
            let mut state = self.state();
            state.calls.push(request.clone());
            (state.scripted.pop_front(), state.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        next.unwrap_or_else(|| {
            Ok(ChargeOutcome {
                transaction_id: TransactionId::generate(),
                status: "completed".to_string(),
                gateway_reference: Some("gw_mock".to_string()),
            })
        })
    }
}
