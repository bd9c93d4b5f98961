//! HTTP handler for gateway webhook deliveries.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use crate::adapters::http::{ApiError, AppState};
use crate::application::handlers::IngestWebhookCommand;
use crate::ports::RawWebhookRequest;

pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// POST /api/webhooks/payments
///
/// The raw body is passed through untouched; the signature covers its bytes.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = IngestWebhookCommand {
        request: RawWebhookRequest::new(body.to_vec(), signature),
        deadline: state.deadline(),
    };
    let ack = state.ingest_webhook.handle(cmd).await?;
    Ok(Json(ack))
}
