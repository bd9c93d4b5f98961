//! PaywallDecisionEngine - Access checks and metered enforcement.
//!
//! `check_access` is read-only and cached for a few minutes per
//! (subject, content, plan). `enforce` runs rate limit, subscription and
//! usage in that order and counts the use when it allows.
//!
//! Denials are verdicts, not errors. Only collaborator failures and deadline
//! expiry produce `PaywallError`.
//!
//! The usage read and the increment are separate store calls. Concurrent
//! `enforce` calls for the same subject can all read the same count, so the
//! daily figure may run past the limit by the number of calls in flight.
//! Exhausted usage is reported in the verdict, not refused.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{
    Action, ContentId, Deadline, PlanId, Timestamp, UserId,
};
use crate::domain::paywall::{
    evaluate_subscription, AccessVerdict, DenialReason, PaywallError, UsageSnapshot,
};
use crate::ports::{
    CacheStore, Clock, PaywallMetrics, RateLimitKey, RateLimitResult, RateLimiter,
    SubscriptionLookup, UsageAccountant,
};

pub const ACCESS_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache key for a `check_access` verdict. An absent plan is the empty string.
pub fn access_cache_key(subject: &UserId, content: &ContentId, plan: Option<&PlanId>) -> String {
    format!(
        "paywall:access:{}:{}:{}",
        subject,
        content,
        plan.map(PlanId::as_str).unwrap_or("")
    )
}

#[derive(Debug, Clone)]
pub struct CheckAccessQuery {
    pub subject: UserId,
    pub content_id: ContentId,
    pub plan_id: Option<PlanId>,
    pub deadline: Deadline,
}

#[derive(Debug, Clone)]
pub struct EnforcePaywallCommand {
    pub subject: UserId,
    pub content_id: ContentId,
    pub action: Action,
    pub deadline: Deadline,
}

pub struct PaywallDecisionEngine {
    subscriptions: Arc<dyn SubscriptionLookup>,
    rate_limiter: Arc<dyn RateLimiter>,
    usage: Arc<dyn UsageAccountant>,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn PaywallMetrics>,
    access_cache_ttl: Duration,
}

impl PaywallDecisionEngine {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionLookup>,
        rate_limiter: Arc<dyn RateLimiter>,
        usage: Arc<dyn UsageAccountant>,
        cache: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn PaywallMetrics>,
    ) -> Self {
        Self {
            subscriptions,
            rate_limiter,
            usage,
            cache,
            clock,
            metrics,
            access_cache_ttl: ACCESS_CACHE_TTL,
        }
    }

    pub fn with_access_cache_ttl(mut self, ttl: Duration) -> Self {
        self.access_cache_ttl = ttl;
        self
    }

    // ════════════════════════════════════════════════════════════════════════════
    // CheckAccess
    // ════════════════════════════════════════════════════════════════════════════

    pub async fn check_access(&self, query: CheckAccessQuery) -> Result<AccessVerdict, PaywallError> {
        let key = access_cache_key(&query.subject, &query.content_id, query.plan_id.as_ref());

        if let Some(verdict) = self.cached_verdict(&key, query.deadline).await {
            self.metrics.paywall_check("cache_hit");
            return Ok(verdict);
        }

        let verdict = match self
            .subscription_verdict(&query.subject, query.plan_id.as_ref(), query.deadline)
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::error!(user_id = %query.subject, error = %e, "Failed to check subscription access");
                self.metrics.paywall_check("error");
                return Err(e);
            }
        };

        self.cache_verdict(&key, &verdict, query.deadline).await;
        self.metrics.paywall_check(verdict.metric_label());
        Ok(verdict)
    }

    async fn cached_verdict(&self, key: &str, deadline: Deadline) -> Option<AccessVerdict> {
        let raw = match deadline.run(self.cache.get(key)).await {
            Ok(Ok(raw)) => raw?,
            Ok(Err(e)) => {
                tracing::warn!(key, error = %e, "Access cache read failed");
                return None;
            }
            Err(_) => return None,
        };
        serde_json::from_str(&raw).ok()
    }

    async fn cache_verdict(&self, key: &str, verdict: &AccessVerdict, deadline: Deadline) {
        let raw = match serde_json::to_string(verdict) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize access verdict for cache");
                return;
            }
        };
        match deadline
            .run(self.cache.set_with_ttl(key, &raw, self.access_cache_ttl))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(key, error = %e, "Failed to cache access verdict"),
            Err(_) => tracing::warn!(key, "Access verdict cache write abandoned at deadline"),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Enforce
    // ════════════════════════════════════════════════════════════════════════════

    pub async fn enforce(&self, cmd: EnforcePaywallCommand) -> Result<AccessVerdict, PaywallError> {
        let result = self.decide(&cmd).await;
        match &result {
            Ok(verdict) => self.metrics.paywall_check(verdict.metric_label()),
            Err(e) => {
                tracing::error!(user_id = %cmd.subject, action = %cmd.action, error = %e, "Paywall enforcement failed");
                self.metrics.paywall_check("error");
            }
        }
        result
    }

    async fn decide(&self, cmd: &EnforcePaywallCommand) -> Result<AccessVerdict, PaywallError> {
        // 1. Rate limit
        let key = RateLimitKey::new(cmd.subject.clone(), cmd.action.clone());
        let limited = bounded(cmd.deadline, "rate limit check", self.rate_limiter.check(&key))
            .await?
            .map_err(|e| PaywallError::RateLimiter(e.to_string()))?;
        if let RateLimitResult::Denied(denied) = limited {
            tracing::debug!(
                user_id = %cmd.subject,
                action = %cmd.action,
                retry_after_secs = denied.retry_after_secs,
                "Paywall request rate limited"
            );
            return Ok(AccessVerdict::denied(DenialReason::RateLimited));
        }

        // 2. Subscription
        let verdict = self
            .subscription_verdict(&cmd.subject, None, cmd.deadline)
            .await?;
        if !verdict.allowed {
            return Ok(verdict);
        }

        // 3. Usage, read before counting this call
        let before = bounded(cmd.deadline, "usage status", self.usage.status(&cmd.subject, &cmd.action))
            .await?
            .map_err(|e| PaywallError::Usage(e.to_string()))?;

        // 4. Count this call; a failure is logged and the pre-increment figure reported
        let usage = match bounded(
            cmd.deadline,
            "usage increment",
            self.usage.increment(&cmd.subject, &cmd.action),
        )
        .await
        {
            Ok(Ok(current)) => UsageSnapshot::new(current, before.limit),
            Ok(Err(e)) => {
                tracing::error!(user_id = %cmd.subject, action = %cmd.action, error = %e, "Failed to increment usage");
                before
            }
            Err(e) => {
                tracing::error!(user_id = %cmd.subject, action = %cmd.action, error = %e, "Failed to increment usage");
                before
            }
        };

        Ok(verdict.with_usage(usage))
    }

    async fn subscription_verdict(
        &self,
        subject: &UserId,
        plan: Option<&PlanId>,
        deadline: Deadline,
    ) -> Result<AccessVerdict, PaywallError> {
        let subscription = bounded(
            deadline,
            "subscription lookup",
            self.subscriptions.active_subscription_for(subject),
        )
        .await?
        .map_err(|e| PaywallError::SubscriptionLookup(e.to_string()))?;

        let now: Timestamp = self.clock.now();
        Ok(evaluate_subscription(subscription.as_ref(), plan, now))
    }
}

async fn bounded<F: Future>(
    deadline: Deadline,
    operation: &'static str,
    fut: F,
) -> Result<F::Output, PaywallError> {
    deadline
        .run(fut)
        .await
        .map_err(|_| PaywallError::Timeout(operation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheStore;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::InMemorySubscriptionLookup;
    use crate::adapters::metrics::NoopMetrics;
    use crate::adapters::rate_limiter::{FixedWindowRateLimiter, RateLimitConfig};
    use crate::adapters::usage::{DailyUsageAccountant, UsageConfig};
    use crate::domain::paywall::{DenialKind, SubscriptionSnapshot, SubscriptionStatus};
    use crate::ports::{UsageError, RateLimitError};
    use async_trait::async_trait;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        engine: PaywallDecisionEngine,
        subscriptions: InMemorySubscriptionLookup,
        cache: Arc<InMemoryCacheStore>,
        clock: ManualClock,
    }

    fn start() -> Timestamp {
        Timestamp::from_unix_secs(1_773_144_000).unwrap()
    }

    fn fixture() -> Fixture {
        fixture_with_usage(None)
    }

    fn fixture_with_usage(usage: Option<Arc<dyn UsageAccountant>>) -> Fixture {
        let clock = ManualClock::new(start());
        let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
        let cache = Arc::new(InMemoryCacheStore::new(clock_arc.clone()));
        let subscriptions = InMemorySubscriptionLookup::new();
        let limiter = FixedWindowRateLimiter::new(cache.clone(), RateLimitConfig::default(), clock_arc.clone());
        let usage = usage.unwrap_or_else(|| {
            Arc::new(DailyUsageAccountant::new(
                cache.clone(),
                UsageConfig::default(),
                clock_arc.clone(),
            ))
        });

        let engine = PaywallDecisionEngine::new(
            Arc::new(subscriptions.clone()),
            Arc::new(limiter),
            usage,
            cache.clone(),
            clock_arc,
            Arc::new(NoopMetrics),
        );

        Fixture {
            engine,
            subscriptions,
            cache,
            clock,
        }
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    async fn subscribe(f: &Fixture, plan: &str, status: SubscriptionStatus, ends_in_secs: i64) {
        f.subscriptions
            .insert(
                user(),
                SubscriptionSnapshot {
                    plan_id: PlanId::new(plan).unwrap(),
                    status,
                    end_date: f.clock.now().plus_secs(ends_in_secs),
                },
            )
            .await;
    }

    fn check(plan: Option<&str>) -> CheckAccessQuery {
        CheckAccessQuery {
            subject: user(),
            content_id: ContentId::new("article-42").unwrap(),
            plan_id: plan.map(|p| PlanId::new(p).unwrap()),
            deadline: Deadline::unbounded(),
        }
    }

    fn enforce_cmd() -> EnforcePaywallCommand {
        EnforcePaywallCommand {
            subject: user(),
            content_id: ContentId::new("article-42").unwrap(),
            action: Action::new("view").unwrap(),
            deadline: Deadline::unbounded(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // CheckAccess
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn no_subscription_is_not_found_denial() {
        let f = fixture();
        let verdict = f.engine.check_access(check(None)).await.unwrap();

        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, "No active subscription found");
        assert_eq!(verdict.denial_kind(), Some(DenialKind::NotFound));
    }

    #[tokio::test]
    async fn active_subscription_is_granted_with_expiry() {
        let f = fixture();
        subscribe(&f, "p1", SubscriptionStatus::Active, 600).await;

        let verdict = f.engine.check_access(check(Some("p1"))).await.unwrap();

        assert!(verdict.allowed);
        assert_eq!(verdict.expires_at, Some(f.clock.now().plus_secs(600)));
    }

    #[tokio::test]
    async fn lapsed_active_subscription_is_expired() {
        let f = fixture();
        subscribe(&f, "p1", SubscriptionStatus::Active, -1).await;

        let verdict = f.engine.check_access(check(None)).await.unwrap();

        assert!(!verdict.allowed);
        assert_eq!(verdict.denial, Some(DenialReason::SubscriptionExpired));
    }

    #[tokio::test]
    async fn plan_mismatch_is_forbidden() {
        let f = fixture();
        subscribe(&f, "p1", SubscriptionStatus::Active, 600).await;

        let verdict = f.engine.check_access(check(Some("p2"))).await.unwrap();

        assert_eq!(verdict.denial, Some(DenialReason::PlanMismatch));
        assert_eq!(verdict.denial_kind(), Some(DenialKind::Forbidden));
    }

    #[tokio::test]
    async fn verdict_is_cached_for_five_minutes() {
        let f = fixture();
        subscribe(&f, "p1", SubscriptionStatus::Active, 3600).await;
        assert!(f.engine.check_access(check(None)).await.unwrap().allowed);

        f.subscriptions.remove(&user()).await;
        assert!(f.engine.check_access(check(None)).await.unwrap().allowed);
        assert_eq!(
            f.cache
                .ttl(&access_cache_key(&user(), &ContentId::new("article-42").unwrap(), None))
                .await
                .unwrap(),
            Some(ACCESS_CACHE_TTL)
        );

        f.clock.advance(ACCESS_CACHE_TTL);
        assert!(!f.engine.check_access(check(None)).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn lookup_failure_is_an_error_not_a_denial() {
        let f = fixture();
        f.subscriptions.set_failing(true);

        let err = f.engine.check_access(check(None)).await.unwrap_err();
        assert!(matches!(err, PaywallError::SubscriptionLookup(_)));
    }

    #[test]
    fn cache_key_uses_empty_plan_when_absent() {
        let content = ContentId::new("c1").unwrap();
        assert_eq!(access_cache_key(&user(), &content, None), "paywall:access:u1:c1:");
        assert_eq!(
            access_cache_key(&user(), &content, Some(&PlanId::new("p1").unwrap())),
            "paywall:access:u1:c1:p1"
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Enforce
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn enforce_counts_usage_after_each_allowed_call() {
        let f = fixture();
        subscribe(&f, "p1", SubscriptionStatus::Active, 600).await;

        for expected in 1..=3u64 {
            let verdict = f.engine.enforce(enforce_cmd()).await.unwrap();
            assert!(verdict.allowed);
            let usage = verdict.usage.unwrap();
            assert_eq!(usage.current, expected);
            assert_eq!(usage.remaining, 100 - expected);
        }
    }

    #[tokio::test]
    async fn enforce_denies_without_subscription_and_does_not_count() {
        let f = fixture();

        let verdict = f.engine.enforce(enforce_cmd()).await.unwrap();

        assert!(!verdict.allowed);
        assert_eq!(verdict.denial, Some(DenialReason::NoActiveSubscription));
        assert_eq!(f.cache.get("usage:u1:view").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rate_limit_is_checked_before_subscription() {
        let f = fixture();
        for _ in 0..10 {
            f.engine.enforce(enforce_cmd()).await.unwrap();
        }

        let verdict = f.engine.enforce(enforce_cmd()).await.unwrap();

        assert_eq!(verdict.denial, Some(DenialReason::RateLimited));
        assert_eq!(verdict.denial_kind(), Some(DenialKind::TooManyRequests));
    }

    #[tokio::test]
    async fn exhausted_usage_is_reported_not_refused() {
        let f = fixture();
        subscribe(&f, "p1", SubscriptionStatus::Active, 86_400).await;
        f.cache
            .set_with_ttl("usage:u1:view", "100", Duration::from_secs(3600))
            .await
            .unwrap();

        let verdict = f.engine.enforce(enforce_cmd()).await.unwrap();

        assert!(verdict.allowed);
        let usage = verdict.usage.unwrap();
        assert_eq!(usage.current, 101);
        assert_eq!(usage.remaining, 0);
    }

    struct BrokenIncrement;

    #[async_trait]
    impl UsageAccountant for BrokenIncrement {
        async fn status(&self, _s: &UserId, _a: &Action) -> Result<UsageSnapshot, UsageError> {
            Ok(UsageSnapshot::new(7, 100))
        }

        async fn increment(&self, _s: &UserId, _a: &Action) -> Result<u64, UsageError> {
            Err(UsageError::Unavailable("redis down".to_string()))
        }
    }

    #[tokio::test]
    async fn increment_failure_is_swallowed() {
        let f = fixture_with_usage(Some(Arc::new(BrokenIncrement)));
        subscribe(&f, "p1", SubscriptionStatus::Active, 600).await;

        let verdict = f.engine.enforce(enforce_cmd()).await.unwrap();

        assert!(verdict.allowed);
        assert_eq!(verdict.usage, Some(UsageSnapshot::new(7, 100)));
    }

    struct BrokenLimiter;

    #[async_trait]
    impl RateLimiter for BrokenLimiter {
        async fn check(&self, _key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
            Err(RateLimitError::Unavailable("redis down".to_string()))
        }

        async fn status(
            &self,
            _key: &RateLimitKey,
        ) -> Result<crate::ports::RateLimitStatus, RateLimitError> {
            Err(RateLimitError::Unavailable("redis down".to_string()))
        }

        async fn reset(&self, _key: &RateLimitKey) -> Result<(), RateLimitError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn rate_limiter_failure_surfaces_as_error() {
        let f = fixture();
        let engine = PaywallDecisionEngine::new(
            Arc::new(f.subscriptions.clone()),
            Arc::new(BrokenLimiter),
            Arc::new(BrokenIncrement),
            f.cache.clone(),
            Arc::new(f.clock.clone()),
            Arc::new(NoopMetrics),
        );

        let err = engine.enforce(enforce_cmd()).await.unwrap_err();
        assert!(matches!(err, PaywallError::RateLimiter(_)));
        assert!(err.is_retryable());
    }
}
