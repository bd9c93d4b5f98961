//! PostgreSQL implementation of SubscriptionLookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, Timestamp, UserId};
use crate::domain::paywall::{SubscriptionSnapshot, SubscriptionStatus};
use crate::ports::SubscriptionLookup;

/// Reads the subscription system's `subscriptions` table.
///
/// Returns the newest row with status `active`. Expiry is left to the
/// caller so an active-but-lapsed subscription is reported as expired
/// rather than absent.
pub struct PostgresSubscriptionLookup {
    pool: PgPool,
}

impl PostgresSubscriptionLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    plan_id: String,
    status: String,
    end_date: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionSnapshot {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(SubscriptionSnapshot {
            plan_id: PlanId::new(row.plan_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid plan_id: {}", e))
            })?,
            status: SubscriptionStatus::parse(&row.status),
            end_date: Timestamp::from_datetime(row.end_date),
        })
    }
}

#[async_trait]
impl SubscriptionLookup for PostgresSubscriptionLookup {
    async fn active_subscription_for(
        &self,
        subject: &UserId,
    ) -> Result<Option<SubscriptionSnapshot>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT plan_id, status, end_date
            FROM subscriptions
            WHERE user_id = $1 AND status = 'active'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(subject.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubscriptionSnapshot::try_from).transpose()
    }
}
