//! WebhookWorkerPool - Bounded queue and fixed workers for webhook reactions.
//!
//! Ingestion enqueues the stored event id and acknowledges. Workers pull ids
//! and run the reaction under their own deadline, with no caller waiting.
//!
//! ## Backpressure
//!
//! The queue holds `queue_capacity` ids. `dispatch` waits at most
//! `enqueue_timeout` for a slot and then reports `QueueFull`; the event stays
//! unprocessed in the store for the replayer. Queue depth is published on
//! every enqueue and dequeue.
//!
//! ## Shutdown
//!
//! `shutdown` closes the queue, lets workers drain what is already queued,
//! and waits for them to exit.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio::task::JoinHandle;

use crate::application::handlers::webhook::{ProcessOutcome, ProcessWebhookEventHandler};
use crate::domain::foundation::{Deadline, EventId};
use crate::domain::webhook::WebhookError;
use crate::ports::{DispatchError, PaywallMetrics, WebhookDispatcher};

/// The work a pool worker runs for one queued event.
#[async_trait]
pub trait WebhookEventProcessor: Send + Sync {
    async fn process(&self, event_id: &EventId, deadline: Deadline)
        -> Result<ProcessOutcome, WebhookError>;
}

#[async_trait]
impl WebhookEventProcessor for ProcessWebhookEventHandler {
    async fn process(
        &self,
        event_id: &EventId,
        deadline: Deadline,
    ) -> Result<ProcessOutcome, WebhookError> {
        self.handle(event_id, deadline).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookWorkerPoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub enqueue_timeout: Duration,
    /// Deadline for one reaction, store calls included.
    pub processing_timeout: Duration,
}

impl Default for WebhookWorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
            enqueue_timeout: Duration::from_millis(100),
            processing_timeout: Duration::from_secs(30),
        }
    }
}

impl WebhookWorkerPoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.enqueue_timeout = timeout;
        self
    }

    pub fn with_processing_timeout(mut self, timeout: Duration) -> Self {
        self.processing_timeout = timeout;
        self
    }
}

pub struct WebhookWorkerPool {
    sender: Mutex<Option<mpsc::Sender<EventId>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    depth: Arc<AtomicUsize>,
    metrics: Arc<dyn PaywallMetrics>,
    config: WebhookWorkerPoolConfig,
}

impl WebhookWorkerPool {
    /// Starts the workers. Must be called inside a tokio runtime.
    pub fn start(
        processor: Arc<dyn WebhookEventProcessor>,
        config: WebhookWorkerPoolConfig,
        metrics: Arc<dyn PaywallMetrics>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let depth = Arc::new(AtomicUsize::new(0));

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                tokio::spawn(worker_loop(
                    worker,
                    receiver.clone(),
                    processor.clone(),
                    depth.clone(),
                    metrics.clone(),
                    config.processing_timeout,
                ))
            })
            .collect();

        tracing::info!(
            workers = config.workers.max(1),
            queue_capacity = config.queue_capacity.max(1),
            "Webhook worker pool started"
        );

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            depth,
            metrics,
            config,
        }
    }

    pub fn config(&self) -> &WebhookWorkerPoolConfig {
        &self.config
    }

    /// Ids queued and not yet picked up by a worker.
    pub fn queue_depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Closes the queue and waits for workers to drain it.
    pub async fn shutdown(&self) {
        let sender = self.sender.lock().unwrap_or_else(|e| e.into_inner()).take();
        drop(sender);

        let workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(|e| e.into_inner()));
        for result in join_all(workers).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Webhook worker panicked");
            }
        }
        tracing::info!("Webhook worker pool stopped");
    }
}

#[async_trait]
impl WebhookDispatcher for WebhookWorkerPool {
    async fn dispatch(&self, event_id: EventId) -> Result<(), DispatchError> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(DispatchError::Closed)?;

        // Counted before sending so a fast worker never decrements first.
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;

        match sender.send_timeout(event_id, self.config.enqueue_timeout).await {
            Ok(()) => {
                self.metrics.webhook_queue_depth(depth);
                Ok(())
            }
            Err(SendTimeoutError::Timeout(event_id)) => {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                tracing::warn!(event_id = %event_id, "Webhook queue full");
                Err(DispatchError::QueueFull)
            }
            Err(SendTimeoutError::Closed(_)) => {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                Err(DispatchError::Closed)
            }
        }
    }
}

async fn worker_loop(
    worker: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<EventId>>>,
    processor: Arc<dyn WebhookEventProcessor>,
    depth: Arc<AtomicUsize>,
    metrics: Arc<dyn PaywallMetrics>,
    processing_timeout: Duration,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(event_id) = next else {
            tracing::debug!(worker, "Webhook queue closed, worker exiting");
            return;
        };

        let remaining = depth.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        metrics.webhook_queue_depth(remaining);

        match processor
            .process(&event_id, Deadline::after(processing_timeout))
            .await
        {
            Ok(outcome) => {
                tracing::debug!(worker, event_id = %event_id, outcome = ?outcome, "Webhook event handled");
            }
            Err(e) => {
                tracing::error!(worker, event_id = %event_id, error = %e, "Webhook event processing failed");
            }
        }
    }
}

impl std::fmt::Debug for WebhookWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookWorkerPool")
            .field("config", &self.config)
            .field("queue_depth", &self.queue_depth())
            .finish_non_exhaustive()
    }
}
