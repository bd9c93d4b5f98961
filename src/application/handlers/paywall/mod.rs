//! Paywall handlers.

mod decision_engine;

pub use decision_engine::{
    access_cache_key, CheckAccessQuery, EnforcePaywallCommand, PaywallDecisionEngine,
    ACCESS_CACHE_TTL,
};
