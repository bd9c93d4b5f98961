//! Webhook processing configuration: worker pool, replay and signatures.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::webhook::{WebhookReplayerConfig, WebhookWorkerPoolConfig};
use crate::application::handlers::ReactionFailurePolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// How long ingestion waits for a queue slot before deferring to replay
    #[serde(default = "default_enqueue_timeout")]
    pub enqueue_timeout_ms: u64,

    #[serde(default = "default_processing_timeout")]
    pub processing_timeout_secs: u64,

    #[serde(default)]
    pub failure_policy: ReactionFailurePolicy,

    #[serde(default = "default_replay_interval")]
    pub replay_interval_secs: u64,

    /// Minimum age of an unprocessed event before it is replayed
    #[serde(default = "default_replay_grace")]
    pub replay_grace_secs: u64,

    #[serde(default = "default_replay_batch")]
    pub replay_batch_size: u32,

    /// Maximum age of a signed timestamp
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: u64,
}

impl WebhookConfig {
    pub fn worker_pool(&self) -> WebhookWorkerPoolConfig {
        WebhookWorkerPoolConfig::default()
            .with_workers(self.workers)
            .with_queue_capacity(self.queue_capacity)
            .with_enqueue_timeout(Duration::from_millis(self.enqueue_timeout_ms))
            .with_processing_timeout(Duration::from_secs(self.processing_timeout_secs))
    }

    pub fn replayer(&self) -> WebhookReplayerConfig {
        WebhookReplayerConfig::default()
            .with_interval(Duration::from_secs(self.replay_interval_secs))
            .with_grace_period(Duration::from_secs(self.replay_grace_secs))
            .with_batch_size(self.replay_batch_size)
    }

    pub fn signature_tolerance(&self) -> Duration {
        Duration::from_secs(self.signature_tolerance_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 {
            return Err(ValidationError::MustBePositive("webhook workers"));
        }
        if self.queue_capacity == 0 {
            return Err(ValidationError::MustBePositive("webhook queue capacity"));
        }
        if self.processing_timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("webhook processing timeout"));
        }
        if self.replay_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("webhook replay interval"));
        }
        if self.replay_batch_size == 0 {
            return Err(ValidationError::MustBePositive("webhook replay batch size"));
        }
        if self.signature_tolerance_secs == 0 {
            return Err(ValidationError::MustBePositive("webhook signature tolerance"));
        }
        Ok(())
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            enqueue_timeout_ms: default_enqueue_timeout(),
            processing_timeout_secs: default_processing_timeout(),
            failure_policy: ReactionFailurePolicy::default(),
            replay_interval_secs: default_replay_interval(),
            replay_grace_secs: default_replay_grace(),
            replay_batch_size: default_replay_batch(),
            signature_tolerance_secs: default_signature_tolerance(),
        }
    }
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_enqueue_timeout() -> u64 {
    100
}

fn default_processing_timeout() -> u64 {
    30
}

fn default_replay_interval() -> u64 {
    30
}

fn default_replay_grace() -> u64 {
    60
}

fn default_replay_batch() -> u32 {
    100
}

fn default_signature_tolerance() -> u64 {
    300
}
