//! Integration tests for payment processing behind the circuit breaker.
//!
//! Drives `ProcessPaymentHandler` through a full trip and recovery cycle
//! with a scripted gateway and a manual clock.

use std::sync::Arc;
use std::time::Duration;

use paywall_core::adapters::circuit_breaker::InMemoryCircuitBreaker;
use paywall_core::adapters::gateway::MockGatewayClient;
use paywall_core::adapters::memory::InMemoryTransactionRepository;
use paywall_core::adapters::{InMemoryCacheStore, ManualClock, NoopMetrics};
use paywall_core::application::handlers::{
    GetTransactionHandler, GetTransactionQuery, ProcessPaymentCommand, ProcessPaymentHandler,
};
use paywall_core::domain::foundation::{Deadline, Timestamp};
use paywall_core::domain::payment::{PaymentError, PaymentRequest, TransactionStatus};
use paywall_core::ports::{CircuitBreaker, CircuitBreakerConfig, CircuitState, GatewayError};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    gateway: Arc<MockGatewayClient>,
    breaker: Arc<InMemoryCircuitBreaker>,
    transactions: Arc<InMemoryTransactionRepository>,
    clock: ManualClock,
    payments: ProcessPaymentHandler,
    lookups: GetTransactionHandler,
}

fn harness(threshold: u32, recovery: Duration) -> Harness {
    let clock = ManualClock::new(Timestamp::from_unix_secs(1_773_144_000).unwrap());
    let gateway = Arc::new(MockGatewayClient::new());
    let breaker = Arc::new(InMemoryCircuitBreaker::new(
        "payment_gateway",
        CircuitBreakerConfig::default()
            .with_failure_threshold(threshold)
            .with_recovery_timeout(recovery),
        Arc::new(clock.clone()),
    ));
    let transactions = Arc::new(InMemoryTransactionRepository::new());
    let cache = Arc::new(InMemoryCacheStore::new(Arc::new(clock.clone())));

    let payments = ProcessPaymentHandler::new(
        gateway.clone(),
        breaker.clone(),
        transactions.clone(),
        Arc::new(clock.clone()),
        Arc::new(NoopMetrics),
    );
    let lookups = GetTransactionHandler::new(transactions.clone(), cache);

    Harness {
        gateway,
        breaker,
        transactions,
        clock,
        payments,
        lookups,
    }
}

fn command() -> ProcessPaymentCommand {
    ProcessPaymentCommand {
        request: PaymentRequest {
            user_id: "user-42".to_string(),
            plan_id: "premium".to_string(),
            amount_cents: 1999,
            currency: "USD".to_string(),
            payment_method: "card".to_string(),
            description: None,
        },
        deadline: Deadline::after(Duration::from_secs(5)),
    }
}

fn transport_error() -> GatewayError {
    GatewayError::Transport("connection reset".to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn successful_payment_is_stored_and_readable() {
    let h = harness(5, Duration::from_secs(60));

    let response = h.payments.handle(command()).await.unwrap();
    assert_eq!(response.status, TransactionStatus::Completed);
    assert_eq!(h.transactions.count().await, 1);

    let record = h
        .lookups
        .handle(GetTransactionQuery {
            transaction_id: response.transaction_id.clone(),
            deadline: Deadline::after(Duration::from_secs(1)),
        })
        .await
        .unwrap();
    assert_eq!(record.id, response.transaction_id);
    assert_eq!(record.amount_cents, 1999);
    assert_eq!(record.status, TransactionStatus::Completed);
}

#[tokio::test]
async fn breaker_trips_then_recovers_after_timeout() {
    let h = harness(3, Duration::from_secs(30));

    for _ in 0..3 {
        h.gateway.push_failure(transport_error());
        let err = h.payments.handle(command()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Gateway(_)));
    }
    assert_eq!(h.breaker.state(), CircuitState::Open);

    // Open: rejected without touching the gateway.
    let calls_before = h.gateway.call_count();
    let err = h.payments.handle(command()).await.unwrap_err();
    assert!(matches!(err, PaymentError::ServiceUnavailable));
    assert_eq!(h.gateway.call_count(), calls_before);

    // Recovery timeout elapses; the trial call succeeds and closes the circuit.
    h.clock.advance(Duration::from_secs(30));
    let response = h.payments.handle(command()).await.unwrap();
    assert_eq!(response.status, TransactionStatus::Completed);
    assert_eq!(h.breaker.state(), CircuitState::Closed);
    assert_eq!(h.breaker.metrics().times_opened, 1);
}

#[tokio::test]
async fn failed_trial_reopens_circuit() {
    let h = harness(1, Duration::from_secs(10));

    h.gateway.push_failure(transport_error());
    assert!(h.payments.handle(command()).await.is_err());
    assert_eq!(h.breaker.state(), CircuitState::Open);

    h.clock.advance(Duration::from_secs(10));
    h.gateway.push_failure(transport_error());
    assert!(matches!(
        h.payments.handle(command()).await,
        Err(PaymentError::Gateway(_))
    ));
    assert_eq!(h.breaker.state(), CircuitState::Open);

    assert!(matches!(
        h.payments.handle(command()).await,
        Err(PaymentError::ServiceUnavailable)
    ));
}

#[tokio::test]
async fn declined_status_counts_as_failure_and_stores_nothing() {
    let h = harness(2, Duration::from_secs(60));

    h.gateway.push_status("requires_action");
    let err = h.payments.handle(command()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Gateway(_)));
    assert_eq!(h.transactions.count().await, 0);
    assert_eq!(h.breaker.metrics().consecutive_failures, 1);
}

#[tokio::test]
async fn invalid_request_never_reaches_gateway() {
    let h = harness(5, Duration::from_secs(60));

    let mut cmd = command();
    cmd.request.amount_cents = 0;
    let err = h.payments.handle(cmd).await.unwrap_err();

    assert!(matches!(err, PaymentError::Validation(_)));
    assert_eq!(h.gateway.call_count(), 0);
    assert_eq!(h.breaker.metrics().total_failures, 0);
}
