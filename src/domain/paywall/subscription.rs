//! Subscription snapshot and the entitlement rule applied to it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{PlanId, Timestamp};

use super::{AccessVerdict, DenialReason};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
    Expired,
    Other(String),
}

impl SubscriptionStatus {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "active" => SubscriptionStatus::Active,
            "past_due" => SubscriptionStatus::PastDue,
            "cancelled" | "canceled" => SubscriptionStatus::Cancelled,
            "expired" => SubscriptionStatus::Expired,
            _ => SubscriptionStatus::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Other(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the subscription lookup reports for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    pub end_date: Timestamp,
}

/// Applies the entitlement rule.
///
/// Checks run in order: presence, status, expiry, plan. The first failing
/// check decides the denial reason. `now == end_date` is still entitled.
pub fn evaluate_subscription(
    subscription: Option<&SubscriptionSnapshot>,
    requested_plan: Option<&PlanId>,
    now: Timestamp,
) -> AccessVerdict {
    let Some(subscription) = subscription else {
        return AccessVerdict::denied(DenialReason::NoActiveSubscription);
    };

    if !subscription.status.is_active() {
        return AccessVerdict::denied(DenialReason::SubscriptionInactive);
    }

    if now.is_after(&subscription.end_date) {
        return AccessVerdict::denied(DenialReason::SubscriptionExpired);
    }

    if let Some(plan) = requested_plan {
        if plan != &subscription.plan_id {
            return AccessVerdict::denied(DenialReason::PlanMismatch);
        }
    }

    AccessVerdict::granted(subscription.end_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    fn active(plan: &str, ends_in_secs: i64) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            plan_id: PlanId::new(plan).unwrap(),
            status: SubscriptionStatus::Active,
            end_date: now().plus_secs(ends_in_secs),
        }
    }

    #[test]
    fn missing_subscription_is_denied() {
        let verdict = evaluate_subscription(None, None, now());
        assert!(!verdict.allowed);
        assert_eq!(verdict.denial, Some(DenialReason::NoActiveSubscription));
        assert_eq!(verdict.reason, "No active subscription found");
    }

    #[test]
    fn inactive_status_is_denied() {
        let sub = SubscriptionSnapshot {
            status: SubscriptionStatus::PastDue,
            ..active("p1", 600)
        };
        let verdict = evaluate_subscription(Some(&sub), None, now());
        assert_eq!(verdict.denial, Some(DenialReason::SubscriptionInactive));
    }

    #[test]
    fn expired_subscription_is_denied_even_when_active() {
        let sub = active("p1", -1);
        let verdict = evaluate_subscription(Some(&sub), None, now());
        assert!(!verdict.allowed);
        assert_eq!(verdict.denial, Some(DenialReason::SubscriptionExpired));
    }

    #[test]
    fn end_date_equal_to_now_is_still_allowed() {
        let sub = active("p1", 0);
        assert!(evaluate_subscription(Some(&sub), None, now()).allowed);
    }

    #[test]
    fn plan_mismatch_is_denied() {
        let sub = active("p1", 600);
        let wanted = PlanId::new("p2").unwrap();
        let verdict = evaluate_subscription(Some(&sub), Some(&wanted), now());
        assert_eq!(verdict.denial, Some(DenialReason::PlanMismatch));
    }

    #[test]
    fn status_checked_before_expiry() {
        let sub = SubscriptionSnapshot {
            status: SubscriptionStatus::Cancelled,
            ..active("p1", -100)
        };
        let verdict = evaluate_subscription(Some(&sub), None, now());
        assert_eq!(verdict.denial, Some(DenialReason::SubscriptionInactive));
    }

    #[test]
    fn valid_subscription_carries_end_date() {
        let sub = active("p1", 600);
        let wanted = PlanId::new("p1").unwrap();
        let verdict = evaluate_subscription(Some(&sub), Some(&wanted), now());
        assert!(verdict.allowed);
        assert_eq!(verdict.expires_at, Some(sub.end_date));
        assert_eq!(verdict.reason, "Valid subscription");
    }

    #[test]
    fn status_parse_accepts_both_spellings_of_cancelled() {
        assert_eq!(SubscriptionStatus::parse("canceled"), SubscriptionStatus::Cancelled);
        assert_eq!(SubscriptionStatus::parse("ACTIVE"), SubscriptionStatus::Active);
        assert_eq!(
            SubscriptionStatus::parse("trialing"),
            SubscriptionStatus::Other("trialing".to_string())
        );
    }
}
