//! TransactionRepository port - durable store for payment transactions.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, TransactionId};
use crate::domain::payment::{TransactionRecord, TransactionStatus};

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn save(&self, record: &TransactionRecord) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &TransactionId)
        -> Result<Option<TransactionRecord>, DomainError>;

    /// Returns false if no such transaction exists.
    async fn update_status(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
        at: Timestamp,
    ) -> Result<bool, DomainError>;
}
