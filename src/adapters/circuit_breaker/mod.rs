//! Circuit breaker adapters.
//!
//! - `InMemoryCircuitBreaker` - mutex-guarded, per-process breaker

mod in_memory;

pub use in_memory::InMemoryCircuitBreaker;
