//! Paywall domain - subscription entitlement rule and access verdicts.

mod errors;
mod subscription;
mod verdict;

pub use errors::PaywallError;
pub use subscription::{evaluate_subscription, SubscriptionSnapshot, SubscriptionStatus};
pub use verdict::{AccessVerdict, DenialKind, DenialReason, UsageSnapshot};
