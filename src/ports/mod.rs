//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Resilience Ports
//!
//! - `CircuitBreaker` - Gateway protection state machine
//! - `RateLimiter` - Fixed-window request guard
//! - `UsageAccountant` - Daily usage counters
//!
//! ## Collaborator Ports
//!
//! - `CacheStore` - Shared key/value store with TTL and atomic increment
//! - `GatewayClient` - External payment gateway
//! - `SubscriptionLookup` - Active subscription per subject
//! - `TransactionRepository`, `WebhookEventRepository` - Durable store
//! - `WebhookVerifier` - Delivery authenticity
//! - `WebhookDispatcher` - Hand-off to asynchronous webhook processing
//! - `Clock`, `PaywallMetrics` - Time and observability

mod cache_store;
mod circuit_breaker;
mod clock;
mod gateway_client;
mod metrics;
mod rate_limiter;
mod subscription_lookup;
mod transaction_repository;
mod usage_accountant;
mod webhook_dispatcher;
mod webhook_event_repository;
mod webhook_verifier;

pub use cache_store::{CacheError, CacheStore};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
pub use clock::Clock;
pub use gateway_client::{ChargeOutcome, GatewayClient, GatewayError};
pub use metrics::PaywallMetrics;
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};
pub use subscription_lookup::SubscriptionLookup;
pub use transaction_repository::TransactionRepository;
pub use usage_accountant::{usage_key, UsageAccountant, UsageError};
pub use webhook_dispatcher::{DispatchError, WebhookDispatcher};
pub use webhook_event_repository::{SaveResult, WebhookEventRepository};
pub use webhook_verifier::{RawWebhookRequest, WebhookVerifier};
