//! ProcessPaymentHandler - Command handler for charging through the gateway.
//!
//! The circuit breaker gates the gateway call. Every negative outcome from
//! the gateway (error, timeout, non-success status) counts as a breaker
//! failure. Once the gateway reports success the money has moved, so the
//! transaction write is best-effort and never fails the response.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::Deadline;
use crate::domain::payment::{
    ChargeRequest, PaymentError, PaymentRequest, PaymentResponse, TransactionRecord,
    TransactionStatus,
};
use crate::ports::{
    ChargeOutcome, CircuitBreaker, Clock, GatewayClient, GatewayError, PaywallMetrics,
    TransactionRepository,
};

const OPERATION: &str = "process_payment";

/// Command to charge a subject for a plan.
#[derive(Debug, Clone)]
pub struct ProcessPaymentCommand {
    pub request: PaymentRequest,
    pub deadline: Deadline,
}

pub struct ProcessPaymentHandler {
    gateway: Arc<dyn GatewayClient>,
    breaker: Arc<dyn CircuitBreaker>,
    transactions: Arc<dyn TransactionRepository>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn PaywallMetrics>,
    gateway_timeout: Duration,
}

impl ProcessPaymentHandler {
    pub fn new(
        gateway: Arc<dyn GatewayClient>,
        breaker: Arc<dyn CircuitBreaker>,
        transactions: Arc<dyn TransactionRepository>,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn PaywallMetrics>,
    ) -> Self {
        Self {
            gateway,
            breaker,
            transactions,
            clock,
            metrics,
            gateway_timeout: Duration::from_secs(30),
        }
    }

    /// Upper bound for a single gateway call, applied on top of the request deadline.
    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub async fn handle(&self, cmd: ProcessPaymentCommand) -> Result<PaymentResponse, PaymentError> {
        // 1. Validate before any side effect
        let charge = match cmd.request.validate() {
            Ok(charge) => charge,
            Err(e) => {
                self.metrics.payment_operation(OPERATION, "invalid");
                return Err(e.into());
            }
        };

        // 2. Breaker gate; the lock is released before the gateway call
        if !self.breaker.can_execute() {
            tracing::warn!(user_id = %charge.user_id, "Payment rejected, circuit breaker open");
            self.metrics.payment_operation(OPERATION, "rejected");
            return Err(PaymentError::ServiceUnavailable);
        }

        // 3. Gateway call under the request deadline
        let outcome = match self.charge(&charge, cmd.deadline).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.breaker.record_failure();
                tracing::error!(user_id = %charge.user_id, error = %e, "Payment gateway error");
                self.metrics.payment_operation(OPERATION, "failure");
                return Err(PaymentError::Gateway(e.to_string()));
            }
        };
        self.breaker.record_success();

        // 4. Respond and record
        let response = PaymentResponse {
            transaction_id: outcome.transaction_id,
            status: TransactionStatus::Completed,
            amount_cents: charge.amount_cents,
            currency: charge.currency.clone(),
            created_at: self.clock.now(),
            gateway_reference: outcome.gateway_reference,
        };

        self.persist(&charge, &response, cmd.deadline).await;
        self.metrics.payment_operation(OPERATION, "success");

        tracing::info!(
            user_id = %charge.user_id,
            transaction_id = %response.transaction_id,
            amount_cents = response.amount_cents,
            "Payment processed"
        );
        Ok(response)
    }

    async fn charge(
        &self,
        charge: &ChargeRequest,
        deadline: Deadline,
    ) -> Result<ChargeOutcome, GatewayError> {
        let outcome = deadline
            .capped(self.gateway_timeout)
            .run(self.gateway.charge(charge))
            .await
            .map_err(|_| GatewayError::Timeout)??;

        if !outcome.is_success() {
            return Err(GatewayError::Declined(format!(
                "gateway reported status '{}'",
                outcome.status
            )));
        }
        Ok(outcome)
    }

    async fn persist(&self, charge: &ChargeRequest, response: &PaymentResponse, deadline: Deadline) {
        let record = TransactionRecord::from_charge(charge, response);
        match deadline.run(self.transactions.save(&record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(
                    transaction_id = %record.id,
                    error = %e,
                    "Failed to store transaction"
                );
            }
            Err(_) => {
                tracing::error!(
                    transaction_id = %record.id,
                    "Failed to store transaction: deadline exceeded"
                );
            }
        }
    }
}
