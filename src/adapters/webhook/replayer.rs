//! WebhookReplayer - Background sweep for events that were never processed.
//!
//! Events stay unprocessed when the queue was full at ingestion, when the
//! process stopped before a worker reached them, or when a reaction failed
//! under the `leave_unprocessed` policy. The replayer periodically hands
//! those older than a grace period back to the dispatcher.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 30s | Time between sweeps |
//! | `grace_period` | 60s | Minimum age before an event is replayed |
//! | `batch_size` | 100 | Max events re-dispatched per sweep |

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::DomainError;
use crate::ports::{Clock, DispatchError, WebhookDispatcher, WebhookEventRepository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReplayerConfig {
    pub interval: Duration,
    pub grace_period: Duration,
    pub batch_size: u32,
}

impl Default for WebhookReplayerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            grace_period: Duration::from_secs(60),
            batch_size: 100,
        }
    }
}

impl WebhookReplayerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = size;
        self
    }
}

pub struct WebhookReplayer {
    events: Arc<dyn WebhookEventRepository>,
    dispatcher: Arc<dyn WebhookDispatcher>,
    clock: Arc<dyn Clock>,
    config: WebhookReplayerConfig,
}

impl WebhookReplayer {
    pub fn new(
        events: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<dyn WebhookDispatcher>,
        clock: Arc<dyn Clock>,
        config: WebhookReplayerConfig,
    ) -> Self {
        Self {
            events,
            dispatcher,
            clock,
            config,
        }
    }

    /// Sweeps every `interval` until the shutdown flag flips to true.
    ///
    /// Sweep failures are logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Webhook replayer stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.process_batch().await {
                        tracing::error!(error = %e, "Webhook replay sweep failed");
                    }
                }
            }
        }
    }

    /// Re-dispatches one batch. Returns how many events were queued.
    pub async fn process_batch(&self) -> Result<usize, DomainError> {
        let cutoff = self.clock.now().minus_std(self.config.grace_period);
        let pending = self
            .events
            .find_unprocessed(cutoff, self.config.batch_size)
            .await?;

        let mut queued = 0;
        for event in pending {
            match self.dispatcher.dispatch(event.id.clone()).await {
                Ok(()) => queued += 1,
                Err(DispatchError::QueueFull) => {
                    tracing::warn!(queued, "Webhook queue full, ending replay sweep early");
                    break;
                }
                Err(DispatchError::Closed) => break,
            }
        }

        if queued > 0 {
            tracing::info!(queued, "Replayed unprocessed webhook events");
        }
        Ok(queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::InMemoryWebhookEventRepository;
    use crate::domain::foundation::{EventId, Timestamp};
    use crate::domain::webhook::WebhookEvent;
    use async_trait::async_trait;
    use tokio::sync::RwLock;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct RecordingDispatcher {
        dispatched: RwLock<Vec<EventId>>,
        accept: Option<usize>,
    }

    #[async_trait]
    impl WebhookDispatcher for RecordingDispatcher {
        async fn dispatch(&self, event_id: EventId) -> Result<(), DispatchError> {
            let mut dispatched = self.dispatched.write().await;
            if let Some(accept) = self.accept {
                if dispatched.len() >= accept {
                    return Err(DispatchError::QueueFull);
                }
            }
            dispatched.push(event_id);
            Ok(())
        }
    }

    fn start() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    async fn store(repo: &InMemoryWebhookEventRepository, id: &str, received_at: Timestamp) {
        let body = format!(r#"{{"id":"{}","type":"payment_intent.succeeded"}}"#, id);
        let event = WebhookEvent::from_delivery(body.as_bytes(), received_at).unwrap();
        repo.save(&event).await.unwrap();
    }

    fn replayer(
        repo: &InMemoryWebhookEventRepository,
        dispatcher: Arc<RecordingDispatcher>,
        clock: &ManualClock,
    ) -> WebhookReplayer {
        WebhookReplayer::new(
            Arc::new(repo.clone()),
            dispatcher,
            Arc::new(clock.clone()),
            WebhookReplayerConfig::default().with_grace_period(Duration::from_secs(60)),
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn replays_only_events_older_than_grace() {
        let clock = ManualClock::new(start());
        let repo = InMemoryWebhookEventRepository::new();
        store(&repo, "evt_old", start()).await;
        store(&repo, "evt_new", start().plus_secs(90)).await;
        clock.advance(Duration::from_secs(120));

        let dispatcher = Arc::new(RecordingDispatcher::default());
        let queued = replayer(&repo, dispatcher.clone(), &clock)
            .process_batch()
            .await
            .unwrap();

        assert_eq!(queued, 1);
        assert_eq!(
            *dispatcher.dispatched.read().await,
            vec![EventId::new("evt_old").unwrap()]
        );
    }

    #[tokio::test]
    async fn processed_events_are_not_replayed() {
        let clock = ManualClock::new(start());
        let repo = InMemoryWebhookEventRepository::new();
        store(&repo, "evt_1", start()).await;
        repo.mark_processed(&EventId::new("evt_1").unwrap(), start())
            .await
            .unwrap();
        clock.advance(Duration::from_secs(600));

        let dispatcher = Arc::new(RecordingDispatcher::default());
        let queued = replayer(&repo, dispatcher, &clock).process_batch().await.unwrap();
        assert_eq!(queued, 0);
    }

    #[tokio::test]
    async fn full_queue_ends_sweep_early() {
        let clock = ManualClock::new(start());
        let repo = InMemoryWebhookEventRepository::new();
        for n in 0..5 {
            store(&repo, &format!("evt_{}", n), start().plus_secs(n)).await;
        }
        clock.advance(Duration::from_secs(600));

        let dispatcher = Arc::new(RecordingDispatcher {
            dispatched: RwLock::new(Vec::new()),
            accept: Some(2),
        });
        let queued = replayer(&repo, dispatcher, &clock).process_batch().await.unwrap();
        assert_eq!(queued, 2);
    }

    #[tokio::test]
    async fn store_failure_is_returned() {
        let clock = ManualClock::new(start());
        let repo = InMemoryWebhookEventRepository::new();
        repo.set_failing(true);

        let dispatcher = Arc::new(RecordingDispatcher::default());
        assert!(replayer(&repo, dispatcher, &clock).process_batch().await.is_err());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let clock = ManualClock::new(start());
        let repo = InMemoryWebhookEventRepository::new();
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let replayer = replayer(&repo, dispatcher, &clock);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { replayer.run(rx).await });
        tx.send(true).unwrap();

        time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
