//! Metrics sink adapters.
//!
//! - `PrometheusMetrics` - owned registry, text exposition for `/metrics`
//! - `NoopMetrics` - discards everything

mod noop;
mod prometheus;

pub use self::prometheus::{MetricsError, PrometheusMetrics};
pub use noop::NoopMetrics;
