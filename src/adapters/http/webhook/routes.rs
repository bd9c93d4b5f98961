//! Axum router configuration for webhook endpoints.

use axum::{routing::post, Router};

use super::handlers::handle_payment_webhook;
use crate::adapters::http::AppState;

/// Mounted at `/api/webhooks`.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payments", post(handle_payment_webhook))
}
