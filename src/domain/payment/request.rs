//! Payment request and response value objects.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, Timestamp, TransactionId, UserId, ValidationError};

use super::TransactionStatus;

/// Inbound payment request as received over the wire.
///
/// Nothing in here is trusted until [`PaymentRequest::validate`] succeeds.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub user_id: String,
    pub plan_id: String,
    /// Amount in minor currency units (cents).
    pub amount_cents: i64,
    pub currency: String,
    /// Opaque payment method token issued by the gateway.
    pub payment_method: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl PaymentRequest {
    /// Checks every required field and produces a charge the gateway may see.
    pub fn validate(self) -> Result<ChargeRequest, ValidationError> {
        let user_id = UserId::new(self.user_id)?;
        let plan_id = PlanId::new(self.plan_id)?;

        if self.amount_cents <= 0 {
            return Err(ValidationError::not_positive("amount_cents", self.amount_cents));
        }

        let currency = self.currency.trim();
        if currency.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a 3-letter ISO 4217 code",
            ));
        }

        if self.payment_method.trim().is_empty() {
            return Err(ValidationError::empty_field("payment_method"));
        }

        Ok(ChargeRequest {
            user_id,
            plan_id,
            amount_cents: self.amount_cents,
            currency: currency.to_ascii_uppercase(),
            payment_method: self.payment_method,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// A validated charge, the only shape handed to the gateway client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeRequest {
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub amount_cents: i64,
    pub currency: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Result returned to the caller of `ProcessPayment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub transaction_id: TransactionId,
    pub status: TransactionStatus,
    pub amount_cents: i64,
    pub currency: String,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PaymentRequest {
        PaymentRequest {
            user_id: "u1".to_string(),
            plan_id: "p1".to_string(),
            amount_cents: 1999,
            currency: "usd".to_string(),
            payment_method: "pm_card_visa".to_string(),
            description: Some("Monthly plan".to_string()),
        }
    }

    #[test]
    fn valid_request_produces_normalized_charge() {
        let charge = request().validate().unwrap();
        assert_eq!(charge.user_id.as_str(), "u1");
        assert_eq!(charge.currency, "USD");
        assert_eq!(charge.amount_cents, 1999);
    }

    #[test]
    fn zero_amount_is_rejected() {
        let err = PaymentRequest {
            amount_cents: 0,
            ..request()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "amount_cents");
    }

    #[test]
    fn negative_amount_is_rejected() {
        let result = PaymentRequest {
            amount_cents: -100,
            ..request()
        }
        .validate();
        assert!(result.is_err());
    }

    #[test]
    fn missing_subject_is_rejected() {
        let err = PaymentRequest {
            user_id: String::new(),
            ..request()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "user_id");
    }

    #[test]
    fn malformed_currency_is_rejected() {
        for currency in ["", "US", "US1", "dollars"] {
            let result = PaymentRequest {
                currency: currency.to_string(),
                ..request()
            }
            .validate();
            assert!(result.is_err(), "currency {:?} should be rejected", currency);
        }
    }

    #[test]
    fn missing_payment_method_is_rejected() {
        let err = PaymentRequest {
            payment_method: " ".to_string(),
            ..request()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "payment_method");
    }

    #[test]
    fn blank_description_is_dropped() {
        let charge = PaymentRequest {
            description: Some("  ".to_string()),
            ..request()
        }
        .validate()
        .unwrap();
        assert_eq!(charge.description, None);
    }
}
