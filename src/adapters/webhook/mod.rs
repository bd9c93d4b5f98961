//! Webhook adapters.
//!
//! - `HmacWebhookVerifier` - `t=<unix>,v1=<hex>` signatures with a tolerance window
//! - `AcceptAllVerifier` - development only, no secret configured
//! - `WebhookWorkerPool` - bounded queue feeding a fixed set of reaction workers
//! - `WebhookReplayer` - periodic re-dispatch of events left unprocessed

mod hmac_verifier;
mod replayer;
mod worker_pool;

pub use hmac_verifier::{AcceptAllVerifier, HmacWebhookVerifier, DEFAULT_TOLERANCE};
pub use replayer::{WebhookReplayer, WebhookReplayerConfig};
pub use worker_pool::{WebhookEventProcessor, WebhookWorkerPool, WebhookWorkerPoolConfig};
