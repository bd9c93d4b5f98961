//! Access verdicts returned by the decision engine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Category a denial belongs to. Always delivered inside a verdict, never
/// as an error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NotFound,
    Forbidden,
    TooManyRequests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    NoActiveSubscription,
    SubscriptionInactive,
    SubscriptionExpired,
    PlanMismatch,
    RateLimited,
}

impl DenialReason {
    pub fn kind(&self) -> DenialKind {
        match self {
            DenialReason::NoActiveSubscription => DenialKind::NotFound,
            DenialReason::SubscriptionInactive
            | DenialReason::SubscriptionExpired
            | DenialReason::PlanMismatch => DenialKind::Forbidden,
            DenialReason::RateLimited => DenialKind::TooManyRequests,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::NoActiveSubscription => "No active subscription found",
            DenialReason::SubscriptionInactive => "Subscription is not active",
            DenialReason::SubscriptionExpired => "Subscription has expired",
            DenialReason::PlanMismatch => "Plan mismatch",
            DenialReason::RateLimited => "Rate limit exceeded",
        }
    }

    /// Label used for the `paywall_checks_total{result}` counter.
    pub fn metric_label(&self) -> &'static str {
        match self {
            DenialReason::NoActiveSubscription => "denied_no_subscription",
            DenialReason::SubscriptionInactive => "denied_inactive",
            DenialReason::SubscriptionExpired => "denied_expired",
            DenialReason::PlanMismatch => "denied_plan_mismatch",
            DenialReason::RateLimited => "denied_rate_limited",
        }
    }
}

/// Daily usage figures for one (subject, action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub current: u64,
    pub limit: u64,
    pub remaining: u64,
}

impl UsageSnapshot {
    pub fn new(current: u64, limit: u64) -> Self {
        Self {
            current,
            limit,
            remaining: limit.saturating_sub(current),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessVerdict {
    pub allowed: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial: Option<DenialReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSnapshot>,
}

impl AccessVerdict {
    pub fn granted(expires_at: Timestamp) -> Self {
        Self {
            allowed: true,
            reason: "Valid subscription".to_string(),
            denial: None,
            expires_at: Some(expires_at),
            usage: None,
        }
    }

    pub fn denied(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: reason.message().to_string(),
            denial: Some(reason),
            expires_at: None,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: UsageSnapshot) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn denial_kind(&self) -> Option<DenialKind> {
        self.denial.map(|d| d.kind())
    }

    pub fn metric_label(&self) -> &'static str {
        match self.denial {
            Some(reason) => reason.metric_label(),
            None => "allowed",
        }
    }
}
