//! Simulated gateway for local development.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::foundation::TransactionId;
use crate::domain::payment::ChargeRequest;
use crate::ports::{ChargeOutcome, GatewayClient, GatewayError};

/// Completes charges after a fixed delay, failing a configured share of them.
#[derive(Debug, Clone)]
pub struct SimulatedGatewayClient {
    latency: Duration,
    failure_percent: u8,
}

impl Default for SimulatedGatewayClient {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), 5)
    }
}

impl SimulatedGatewayClient {
    pub fn new(latency: Duration, failure_percent: u8) -> Self {
        Self {
            latency,
            failure_percent: failure_percent.min(100),
        }
    }

    fn roll_failure(&self) -> bool {
        loop {
            let bytes = Uuid::new_v4().into_bytes();
            if let Some(roll) = percentile(u16::from_be_bytes([bytes[0], bytes[1]])) {
                return roll < self.failure_percent;
            }
        }
    }
}

/// Largest multiple of 100 that fits in a `u16`; samples at or above it are redrawn.
const UNBIASED_LIMIT: u16 = 65_500;

/// Maps a uniform `u16` onto 0..100, or `None` when the sample must be redrawn.
fn percentile(sample: u16) -> Option<u8> {
    (sample < UNBIASED_LIMIT).then(|| (sample % 100) as u8)
}

#[async_trait]
impl GatewayClient for SimulatedGatewayClient {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        tokio::time::sleep(self.latency).await;

        if self.roll_failure() {
            tracing::debug!(user_id = %request.user_id, "Simulated gateway failure");
            return Err(GatewayError::Transport(
                "simulated gateway failure".to_string(),
            ));
        }

        Ok(ChargeOutcome {
            transaction_id: TransactionId::generate(),
            status: "completed".to_string(),
            gateway_reference: Some(format!("gw_{}", Uuid::new_v4().simple())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentRequest;

    #[test]
    fn percentile_buckets_are_uniform() {
        let mut counts = [0u32; 100];
        for sample in 0..UNBIASED_LIMIT {
            let roll = percentile(sample).unwrap();
            counts[roll as usize] += 1;
        }
        assert!(counts.iter().all(|c| *c == 655));

        let under_five: u32 = counts[..5].iter().sum();
        assert_eq!(under_five, 3275);
    }

    #[test]
    fn samples_past_limit_are_redrawn() {
        for sample in UNBIASED_LIMIT..=u16::MAX {
            assert_eq!(percentile(sample), None);
        }
    }

    fn charge() -> ChargeRequest {
        PaymentRequest {
            user_id: "u1".to_string(),
            plan_id: "p1".to_string(),
            amount_cents: 500,
            currency: "usd".to_string(),
            payment_method: "pm_test".to_string(),
            description: None,
        }
        .validate()
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn never_fails_at_zero_percent() {
        let gateway = SimulatedGatewayClient::new(Duration::from_millis(100), 0);
        for _ in 0..20 {
            let outcome = gateway.charge(&charge()).await.unwrap();
            assert!(outcome.is_success());
            assert!(outcome.transaction_id.as_str().starts_with("txn_"));
            assert!(outcome.gateway_reference.unwrap().starts_with("gw_"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn always_fails_at_hundred_percent() {
        let gateway = SimulatedGatewayClient::new(Duration::ZERO, 100);
        assert!(matches!(
            gateway.charge(&charge()).await,
            Err(GatewayError::Transport(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_configured_latency() {
        let gateway = SimulatedGatewayClient::new(Duration::from_millis(100), 0);
        let started = tokio::time::Instant::now();
        gateway.charge(&charge()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
