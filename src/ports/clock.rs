//! Clock port - source of the current time.
//!
//! Every time-dependent rule (breaker recovery, TTL expiry, subscription
//! expiry, day boundaries) reads time through this port so tests can drive
//! it with a manual clock.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Timestamp;
}
