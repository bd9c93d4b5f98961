//! HTTP gateway client.
//!
//! Posts the validated charge as JSON to `{base_url}/charges` with the API
//! key as a bearer token and reads back the gateway's transaction record.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::TransactionId;
use crate::domain::payment::ChargeRequest;
use crate::ports::{ChargeOutcome, GatewayClient, GatewayError};

#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    pub api_key: SecretString,
    /// Per-request transport timeout, independent of the caller's deadline.
    pub timeout: Duration,
}

/// Gateway response body.
#[derive(Debug, Deserialize)]
struct ChargeResponseBody {
    transaction_id: String,
    status: String,
    #[serde(default)]
    gateway_reference: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

pub struct HttpGatewayClient {
    config: HttpGatewayConfig,
    http_client: reqwest::Client,
}

impl HttpGatewayClient {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn charges_url(&self) -> String {
        format!("{}/charges", self.config.base_url.trim_end_matches('/'))
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(e.to_string())
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        let response = self
            .http_client
            .post(self.charges_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::PAYMENT_REQUIRED {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Declined(error_text));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Gateway charge failed");
            return Err(GatewayError::Transport(format!(
                "gateway returned {}: {}",
                status, error_text
            )));
        }

        let body: ChargeResponseBody = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let transaction_id = TransactionId::new(body.transaction_id)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(ChargeOutcome {
            transaction_id,
            status: body.status,
            gateway_reference: body.gateway_reference.or(body.id),
        })
    }
}

impl std::fmt::Debug for HttpGatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGatewayClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpGatewayClient {
        HttpGatewayClient::new(HttpGatewayConfig {
            base_url: base_url.to_string(),
            api_key: SecretString::new("sk_test".to_string()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn charges_url_tolerates_trailing_slash() {
        assert_eq!(client("https://gw.test/").charges_url(), "https://gw.test/charges");
        assert_eq!(client("https://gw.test").charges_url(), "https://gw.test/charges");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", client("https://gw.test"));
        assert!(!rendered.contains("sk_test"));
    }

    #[test]
    fn response_body_accepts_id_as_reference() {
        let body: ChargeResponseBody = serde_json::from_str(
            r#"{"transaction_id":"txn_1","status":"succeeded","id":"ch_9"}"#,
        )
        .unwrap();
        assert_eq!(body.id.as_deref(), Some("ch_9"));
        assert_eq!(body.gateway_reference, None);
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_transport_error() {
        let result = client("http://127.0.0.1:1").charge(&sample_charge()).await;
        assert!(matches!(
            result,
            Err(GatewayError::Transport(_)) | Err(GatewayError::Timeout)
        ));
    }

    fn sample_charge() -> ChargeRequest {
        crate::domain::payment::PaymentRequest {
            user_id: "u1".to_string(),
            plan_id: "p1".to_string(),
            amount_cents: 100,
            currency: "usd".to_string(),
            payment_method: "pm".to_string(),
            description: None,
        }
        .validate()
        .unwrap()
    }
}
