//! PostgreSQL implementation of TransactionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{
    DomainError, ErrorCode, PlanId, Timestamp, TransactionId, UserId,
};
use crate::domain::payment::{TransactionRecord, TransactionStatus};
use crate::ports::TransactionRepository;

pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment transaction.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    user_id: String,
    plan_id: String,
    amount_cents: i64,
    currency: String,
    status: String,
    payment_method: String,
    gateway_transaction_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status = TransactionStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid transaction status: {}", row.status),
            )
        })?;

        Ok(TransactionRecord {
            id: TransactionId::new(row.id).map_err(invalid_column)?,
            user_id: UserId::new(row.user_id).map_err(invalid_column)?,
            plan_id: PlanId::new(row.plan_id).map_err(invalid_column)?,
            amount_cents: row.amount_cents,
            currency: row.currency,
            status,
            payment_method: row.payment_method,
            gateway_reference: row.gateway_transaction_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn invalid_column(e: crate::domain::foundation::ValidationError) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored value: {}", e))
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn save(&self, record: &TransactionRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, user_id, plan_id, amount_cents, currency, status,
                payment_method, gateway_transaction_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.user_id.as_str())
        .bind(record.plan_id.as_str())
        .bind(record.amount_cents)
        .bind(&record.currency)
        .bind(record.status.as_str())
        .bind(&record.payment_method)
        .bind(&record.gateway_reference)
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to save transaction: {}", e))
                .with_detail("transaction_id", record.id.as_str())
        })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<TransactionRecord>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, amount_cents, currency, status,
                   payment_method, gateway_transaction_id, created_at, updated_at
            FROM payment_transactions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TransactionRecord::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_transactions
            SET status = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(status.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
