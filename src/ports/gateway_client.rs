//! GatewayClient port - the external payment gateway.
//!
//! Only invoked when the circuit breaker allows. Latency and failure rate are
//! the gateway's business; the processor treats every non-success uniformly.

use async_trait::async_trait;

use crate::domain::foundation::TransactionId;
use crate::domain::payment::{ChargeRequest, TransactionStatus};

#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeOutcome {
    pub transaction_id: TransactionId,
    /// Raw status string as reported by the gateway.
    pub status: String,
    pub gateway_reference: Option<String>,
}

impl ChargeOutcome {
    /// Normalized status; `None` for vocabulary we do not recognize.
    pub fn transaction_status(&self) -> Option<TransactionStatus> {
        TransactionStatus::parse(&self.status)
    }

    pub fn is_success(&self) -> bool {
        self.transaction_status() == Some(TransactionStatus::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("charge declined: {0}")]
    Declined(String),

    #[error("gateway unreachable: {0}")]
    Transport(String),

    #[error("gateway returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("gateway call timed out")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: &str) -> ChargeOutcome {
        ChargeOutcome {
            transaction_id: TransactionId::new("txn_1").unwrap(),
            status: status.to_string(),
            gateway_reference: None,
        }
    }

    #[test]
    fn completed_and_synonyms_are_success() {
        assert!(outcome("completed").is_success());
        assert!(outcome("succeeded").is_success());
    }

    #[test]
    fn pending_or_unknown_is_not_success() {
        assert!(!outcome("pending").is_success());
        assert!(!outcome("requires_action").is_success());
        assert_eq!(outcome("requires_action").transaction_status(), None);
    }
}
