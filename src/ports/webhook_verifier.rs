//! WebhookVerifier port - authenticity check over a raw delivery.

use crate::domain::webhook::WebhookError;

/// The parts of an inbound HTTP delivery the verifier may inspect.
#[derive(Debug, Clone)]
pub struct RawWebhookRequest {
    pub body: Vec<u8>,
    pub signature: Option<String>,
}

impl RawWebhookRequest {
    pub fn new(body: impl Into<Vec<u8>>, signature: Option<String>) -> Self {
        Self {
            body: body.into(),
            signature,
        }
    }
}

pub trait WebhookVerifier: Send + Sync {
    /// `Ok(())` if the delivery is authentic, otherwise the reason it is not.
    fn verify(&self, request: &RawWebhookRequest) -> Result<(), WebhookError>;
}
