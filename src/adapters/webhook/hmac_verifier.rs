//! HMAC-SHA256 webhook signature verification.
//!
//! Deliveries carry `X-Webhook-Signature: t=<unix>,v1=<hex>`. The signed
//! timestamp must be within the tolerance window of the injected clock, which
//! bounds how long a captured delivery can be replayed.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::webhook::{compute_signature, SignatureHeader, WebhookError};
use crate::ports::{Clock, RawWebhookRequest, WebhookVerifier};

/// Maximum allowed age for webhook deliveries (5 minutes).
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Maximum allowed clock skew for future timestamps (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

pub struct HmacWebhookVerifier {
    /// Shared signing secret configured with the gateway.
    secret: SecretString,
    tolerance: Duration,
    clock: Arc<dyn Clock>,
}

impl HmacWebhookVerifier {
    pub fn new(secret: SecretString, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret,
            tolerance: DEFAULT_TOLERANCE,
            clock,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Validates that the timestamp is within acceptable bounds.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        // `t=` is untrusted; an unrepresentable age is as stale as it gets.
        let age = self
            .clock
            .now()
            .as_unix_secs()
            .checked_sub(timestamp)
            .ok_or(WebhookError::TimestampOutOfRange)?;
        let max_age = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);

        if age > max_age {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }
        Ok(())
    }
}

impl WebhookVerifier for HmacWebhookVerifier {
    fn verify(&self, request: &RawWebhookRequest) -> Result<(), WebhookError> {
        let header = request
            .signature
            .as_deref()
            .ok_or(WebhookError::MissingSignature)?;

        let header = SignatureHeader::parse(header)?;
        self.validate_timestamp(header.timestamp)?;

        let expected = compute_signature(
            self.secret.expose_secret().as_bytes(),
            header.timestamp,
            &request.body,
        )?;
        if !header.matches(&expected) {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }
}

impl std::fmt::Debug for HmacWebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacWebhookVerifier")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

/// Accepts every delivery. Development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

impl WebhookVerifier for AcceptAllVerifier {
    fn verify(&self, _request: &RawWebhookRequest) -> Result<(), WebhookError> {
        Ok(())
    }
}
