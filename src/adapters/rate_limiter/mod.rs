//! Rate limiter adapters.
//!
//! - `FixedWindowRateLimiter` - counter per (subject, action) in any `CacheStore`
//!
//! ## Usage
//!
//! ```ignore
//! use paywall_core::adapters::rate_limiter::{FixedWindowRateLimiter, RateLimitConfig};
//!
//! let limiter = FixedWindowRateLimiter::new(cache, RateLimitConfig::default(), clock);
//! ```

mod config;
mod fixed_window;

pub use config::RateLimitConfig;
pub use fixed_window::FixedWindowRateLimiter;
