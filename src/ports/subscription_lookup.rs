//! SubscriptionLookup port - read-only view of a subject's subscription.
//!
//! Subscription CRUD lives elsewhere; this core only asks for the newest
//! active subscription of a subject.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::paywall::SubscriptionSnapshot;

#[async_trait]
pub trait SubscriptionLookup: Send + Sync {
    /// Returns `Ok(None)` when the subject has no active subscription.
    async fn active_subscription_for(
        &self,
        subject: &UserId,
    ) -> Result<Option<SubscriptionSnapshot>, DomainError>;
}
