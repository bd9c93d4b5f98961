//! Durable record of a charge attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{PlanId, Timestamp, TransactionId, UserId};

use super::{ChargeRequest, PaymentResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    /// Parses the classification string stored by the gateway or database.
    ///
    /// Gateways disagree on vocabulary, so common synonyms are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" | "processing" => Some(TransactionStatus::Pending),
            "completed" | "succeeded" | "success" | "paid" => Some(TransactionStatus::Completed),
            "failed" | "declined" | "error" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub amount_cents: i64,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_method: String,
    pub gateway_reference: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TransactionRecord {
    pub fn from_charge(charge: &ChargeRequest, response: &PaymentResponse) -> Self {
        Self {
            id: response.transaction_id.clone(),
            user_id: charge.user_id.clone(),
            plan_id: charge.plan_id.clone(),
            amount_cents: response.amount_cents,
            currency: response.currency.clone(),
            status: response.status,
            payment_method: charge.payment_method.clone(),
            gateway_reference: response.gateway_reference.clone(),
            created_at: response.created_at,
            updated_at: response.created_at,
        }
    }
}
