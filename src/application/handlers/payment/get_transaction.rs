//! GetTransactionHandler - Query handler for a single transaction record.
//!
//! Read-through cache in front of the durable store. Cache failures are
//! logged and bypassed; only the store decides whether a record exists.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{Deadline, TransactionId};
use crate::domain::payment::{PaymentError, TransactionRecord};
use crate::ports::{CacheStore, TransactionRepository};

pub const TRANSACTION_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct GetTransactionQuery {
    pub transaction_id: TransactionId,
    pub deadline: Deadline,
}

pub struct GetTransactionHandler {
    transactions: Arc<dyn TransactionRepository>,
    cache: Arc<dyn CacheStore>,
}

/// Cache key for a transaction record.
pub fn transaction_cache_key(id: &TransactionId) -> String {
    format!("transaction:{}", id)
}

impl GetTransactionHandler {
    pub fn new(transactions: Arc<dyn TransactionRepository>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            transactions,
            cache,
        }
    }

    pub async fn handle(&self, query: GetTransactionQuery) -> Result<TransactionRecord, PaymentError> {
        let key = transaction_cache_key(&query.transaction_id);

        if let Some(record) = self.cached(&key, query.deadline).await {
            return Ok(record);
        }

        let record = query
            .deadline
            .run(self.transactions.find_by_id(&query.transaction_id))
            .await
            .map_err(|e| PaymentError::Storage(e.to_string()))?
            .map_err(|e| PaymentError::Storage(e.to_string()))?
            .ok_or_else(|| PaymentError::NotFound(query.transaction_id.clone()))?;

        self.store_in_cache(&key, &record, query.deadline).await;
        Ok(record)
    }

    async fn cached(&self, key: &str, deadline: Deadline) -> Option<TransactionRecord> {
        let raw = match deadline.run(self.cache.get(key)).await {
            Ok(Ok(raw)) => raw?,
            Ok(Err(e)) => {
                tracing::warn!(key, error = %e, "Transaction cache read failed");
                return None;
            }
            Err(_) => return None,
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable cached transaction");
                None
            }
        }
    }

    async fn store_in_cache(&self, key: &str, record: &TransactionRecord, deadline: Deadline) {
        let Ok(raw) = serde_json::to_string(record) else {
            return;
        };
        match deadline
            .run(self.cache.set_with_ttl(key, &raw, TRANSACTION_CACHE_TTL))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(key, error = %e, "Transaction cache write failed"),
            Err(_) => tracing::warn!(key, "Transaction cache write abandoned at deadline"),
        }
    }
}
