//! Integration tests for webhook ingestion, asynchronous processing and replay.
//!
//! These tests verify the end-to-end flow:
//! 1. A signed delivery is verified, stored and acknowledged
//! 2. The worker pool applies the reaction to the referenced transaction
//! 3. Redeliveries are acknowledged without a second reaction
//! 4. Events that could not be queued are picked up by the replayer
//!
//! Uses in-memory stores and a manual clock.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use paywall_core::adapters::memory::{InMemoryTransactionRepository, InMemoryWebhookEventRepository};
use paywall_core::adapters::{
    HmacWebhookVerifier, ManualClock, NoopMetrics, WebhookReplayer, WebhookReplayerConfig,
    WebhookWorkerPool, WebhookWorkerPoolConfig,
};
use paywall_core::application::handlers::{
    IngestWebhookCommand, IngestWebhookHandler, ProcessWebhookEventHandler,
};
use paywall_core::domain::foundation::{Deadline, EventId, PlanId, Timestamp, TransactionId, UserId};
use paywall_core::domain::payment::{TransactionRecord, TransactionStatus};
use paywall_core::domain::webhook::{signature_header, WebhookError};
use paywall_core::ports::{
    Clock, RawWebhookRequest, TransactionRepository, WebhookDispatcher, WebhookEventRepository,
};

const SECRET: &str = "whsec_scenario";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    clock: ManualClock,
    events: InMemoryWebhookEventRepository,
    transactions: InMemoryTransactionRepository,
    pool: Arc<WebhookWorkerPool>,
    ingest: IngestWebhookHandler,
}

fn start_pool(
    events: &InMemoryWebhookEventRepository,
    transactions: &InMemoryTransactionRepository,
    clock: &ManualClock,
) -> Arc<WebhookWorkerPool> {
    let processor = ProcessWebhookEventHandler::new(
        Arc::new(events.clone()),
        Arc::new(transactions.clone()),
        Arc::new(clock.clone()),
        Arc::new(NoopMetrics),
    );
    Arc::new(WebhookWorkerPool::start(
        Arc::new(processor),
        WebhookWorkerPoolConfig::default().with_workers(2),
        Arc::new(NoopMetrics),
    ))
}

fn harness() -> Harness {
    let clock = ManualClock::new(Timestamp::from_unix_secs(1_773_144_000).unwrap());
    let events = InMemoryWebhookEventRepository::new();
    let transactions = InMemoryTransactionRepository::new();
    let pool = start_pool(&events, &transactions, &clock);

    let ingest = IngestWebhookHandler::new(
        Arc::new(HmacWebhookVerifier::new(
            SecretString::new(SECRET.to_string()),
            Arc::new(clock.clone()),
        )),
        Arc::new(events.clone()),
        pool.clone(),
        Arc::new(clock.clone()),
        Arc::new(NoopMetrics),
    );

    Harness {
        clock,
        events,
        transactions,
        pool,
        ingest,
    }
}

async fn seed_transaction(h: &Harness, id: &str) -> TransactionId {
    let now = h.clock.now();
    let record = TransactionRecord {
        id: TransactionId::new(id).unwrap(),
        user_id: UserId::new("user-42").unwrap(),
        plan_id: PlanId::new("premium").unwrap(),
        amount_cents: 1999,
        currency: "USD".to_string(),
        status: TransactionStatus::Completed,
        payment_method: "card".to_string(),
        gateway_reference: None,
        created_at: now,
        updated_at: now,
    };
    h.transactions.save(&record).await.unwrap();
    record.id
}

fn delivery(h: &Harness, event_id: &str, event_type: &str, transaction: &str) -> IngestWebhookCommand {
    let body = format!(
        r#"{{"id":"{}","type":"{}","data":{{"transaction_id":"{}"}}}}"#,
        event_id, event_type, transaction
    );
    let header = signature_header(SECRET.as_bytes(), h.clock.now().as_unix_secs(), body.as_bytes())
        .unwrap();
    IngestWebhookCommand {
        request: RawWebhookRequest::new(body.into_bytes(), Some(header)),
        deadline: Deadline::after(Duration::from_secs(5)),
    }
}

async fn status_of(h: &Harness, id: &TransactionId) -> TransactionStatus {
    h.transactions.find_by_id(id).await.unwrap().unwrap().status
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn failed_payment_event_updates_transaction() {
    let h = harness();
    let txn = seed_transaction(&h, "txn_scenario_1").await;

    let ack = h
        .ingest
        .handle(delivery(&h, "evt_1", "payment_intent.payment_failed", "txn_scenario_1"))
        .await
        .unwrap();
    assert!(!ack.duplicate);
    assert_eq!(ack.event_id, EventId::new("evt_1").unwrap());

    h.pool.shutdown().await;

    assert_eq!(status_of(&h, &txn).await, TransactionStatus::Failed);
    let stored = h.events.find_by_id(&ack.event_id).await.unwrap().unwrap();
    assert!(stored.processed);
}

#[tokio::test]
async fn redelivery_is_acknowledged_as_duplicate() {
    let h = harness();
    let txn = seed_transaction(&h, "txn_scenario_2").await;

    let first = h
        .ingest
        .handle(delivery(&h, "evt_2", "payment_intent.payment_failed", "txn_scenario_2"))
        .await
        .unwrap();
    let second = h
        .ingest
        .handle(delivery(&h, "evt_2", "payment_intent.succeeded", "txn_scenario_2"))
        .await
        .unwrap();
    h.pool.shutdown().await;

    assert!(!first.duplicate);
    assert!(second.duplicate);
    assert_eq!(h.events.count().await, 1);
    // Only the first delivery's reaction ran.
    assert_eq!(status_of(&h, &txn).await, TransactionStatus::Failed);
}

#[tokio::test]
async fn bad_signature_stores_nothing() {
    let h = harness();
    let mut cmd = delivery(&h, "evt_3", "payment_intent.succeeded", "txn_x");
    cmd.request.signature = Some(format!("t={},v1={}", h.clock.now().as_unix_secs(), "ab".repeat(32)));

    let err = h.ingest.handle(cmd).await.unwrap_err();
    h.pool.shutdown().await;

    assert!(matches!(err, WebhookError::InvalidSignature));
    assert_eq!(h.events.count().await, 0);
}

#[tokio::test]
async fn undispatched_event_is_replayed_later() {
    let h = harness();
    let txn = seed_transaction(&h, "txn_scenario_4").await;

    // Queue closed: the delivery is stored and acknowledged but not processed.
    h.pool.shutdown().await;
    let ack = h
        .ingest
        .handle(delivery(&h, "evt_4", "payment_intent.payment_failed", "txn_scenario_4"))
        .await
        .unwrap();
    assert!(!ack.duplicate);
    assert_eq!(status_of(&h, &txn).await, TransactionStatus::Completed);

    let pool = start_pool(&h.events, &h.transactions, &h.clock);
    let dispatcher: Arc<dyn WebhookDispatcher> = pool.clone();
    let replayer = WebhookReplayer::new(
        Arc::new(h.events.clone()),
        dispatcher,
        Arc::new(h.clock.clone()),
        WebhookReplayerConfig::default().with_grace_period(Duration::from_secs(60)),
    );

    // Inside the grace period nothing is replayed.
    assert_eq!(replayer.process_batch().await.unwrap(), 0);

    h.clock.advance(Duration::from_secs(61));
    assert_eq!(replayer.process_batch().await.unwrap(), 1);
    pool.shutdown().await;

    assert_eq!(status_of(&h, &txn).await, TransactionStatus::Failed);
    assert_eq!(replayer.process_batch().await.unwrap(), 0);
}
