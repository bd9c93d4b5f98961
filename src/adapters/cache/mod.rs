//! Cache store adapters.
//!
//! - `InMemoryCacheStore` - clock-driven store for testing and single-process use
//! - `RedisCacheStore` - Redis-backed for production multi-instance deployments

mod in_memory;
mod redis;

pub use in_memory::InMemoryCacheStore;
pub use self::redis::RedisCacheStore;
