//! Usage accounting adapters.
//!
//! - `DailyUsageAccountant` - per-day counters in any `CacheStore`

mod daily;

pub use daily::{DailyUsageAccountant, UsageConfig};
