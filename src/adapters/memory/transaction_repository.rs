//! In-memory transaction store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp, TransactionId};
use crate::domain::payment::{TransactionRecord, TransactionStatus};
use crate::ports::TransactionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionRepository {
    records: Arc<RwLock<HashMap<TransactionId, TransactionRecord>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::database("transaction store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn save(&self, record: &TransactionRecord) -> Result<(), DomainError> {
        self.check_available()?;
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<TransactionRecord>, DomainError> {
        self.check_available()?;
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        match records.get_mut(id) {
            Some(record) => {
                record.status = status;
                record.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
