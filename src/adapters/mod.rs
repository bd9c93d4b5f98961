//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `cache` - Redis and in-memory key/value stores
//! - `circuit_breaker` - Gateway protection state machine
//! - `clock` - System and manual clocks
//! - `gateway` - Payment gateway clients (HTTP, simulated, mock)
//! - `http` - Axum routes, DTOs and error mapping
//! - `memory` - In-memory repositories and subscription lookup
//! - `metrics` - Prometheus and no-op metrics
//! - `postgres` - PostgreSQL repositories
//! - `rate_limiter` - Fixed-window limiter over the cache store
//! - `usage` - Daily usage counters over the cache store
//! - `webhook` - Signature verification, worker pool and replayer

pub mod cache;
pub mod circuit_breaker;
pub mod clock;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod metrics;
pub mod postgres;
pub mod rate_limiter;
pub mod usage;
pub mod webhook;

pub use cache::{InMemoryCacheStore, RedisCacheStore};
pub use circuit_breaker::InMemoryCircuitBreaker;
pub use clock::{ManualClock, SystemClock};
pub use metrics::{NoopMetrics, PrometheusMetrics};
pub use webhook::{
    AcceptAllVerifier, HmacWebhookVerifier, WebhookReplayer, WebhookReplayerConfig,
    WebhookWorkerPool, WebhookWorkerPoolConfig,
};
