//! PostgreSQL implementation of WebhookEventRepository.
//!
//! The event id is the primary key. `save` uses `ON CONFLICT DO NOTHING`
//! and reads the affected row count to tell a first delivery from a
//! redelivery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, Timestamp};
use crate::domain::webhook::WebhookEvent;
use crate::ports::{SaveResult, WebhookEventRepository};

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
    source: String,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            source: "gateway".to_string(),
        }
    }

    /// Value stored in the `source` column.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    id: String,
    event_type: String,
    payload: Value,
    processed: bool,
    processed_at: Option<DateTime<Utc>>,
    received_at: DateTime<Utc>,
}

impl TryFrom<WebhookEventRow> for WebhookEvent {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        let id = EventId::new(row.id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid event id: {}", e))
        })?;
        Ok(WebhookEvent {
            id,
            event_type: row.event_type,
            payload: row.payload,
            processed: row.processed,
            processed_at: row.processed_at.map(Timestamp::from_datetime),
            received_at: Timestamp::from_datetime(row.received_at),
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, event_type, payload, processed, processed_at, received_at FROM webhook_events";

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn save(&self, event: &WebhookEvent) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (
                id, event_type, source, payload, processed, processed_at, received_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(event.id.as_str())
        .bind(&event.event_type)
        .bind(&self.source)
        .bind(&event.payload)
        .bind(event.processed)
        .bind(event.processed_at.as_ref().map(|t| *t.as_datetime()))
        .bind(event.received_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to store webhook event: {}", e))
                .with_detail("event_id", event.id.as_str())
        })?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<WebhookEvent>, DomainError> {
        let row: Option<WebhookEventRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(WebhookEvent::try_from).transpose()
    }

    async fn mark_processed(&self, id: &EventId, at: Timestamp) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE webhook_events SET processed = true, processed_at = $2 WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_unprocessed(
        &self,
        received_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<WebhookEvent>, DomainError> {
        let rows: Vec<WebhookEventRow> = sqlx::query_as(&format!(
            "{} WHERE processed = false AND received_at < $1 ORDER BY received_at ASC LIMIT $2",
            SELECT_COLUMNS
        ))
        .bind(received_before.as_datetime())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WebhookEvent::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_converts_to_event() {
        let row = WebhookEventRow {
            id: "evt_1".to_string(),
            event_type: "payment_intent.succeeded".to_string(),
            payload: serde_json::json!({"id": "evt_1"}),
            processed: true,
            processed_at: Some(Utc::now()),
            received_at: Utc::now(),
        };

        let event = WebhookEvent::try_from(row).unwrap();
        assert_eq!(event.id.as_str(), "evt_1");
        assert!(event.processed);
        assert!(event.processed_at.is_some());
    }

    #[test]
    fn blank_id_is_rejected() {
        let row = WebhookEventRow {
            id: " ".to_string(),
            event_type: String::new(),
            payload: Value::Null,
            processed: false,
            processed_at: None,
            received_at: Utc::now(),
        };
        assert!(WebhookEvent::try_from(row).is_err());
    }
}
