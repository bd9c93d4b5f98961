//! Axum router configuration for paywall endpoints.

use axum::{routing::post, Router};

use super::handlers::{check_access, enforce};
use crate::adapters::http::AppState;

/// Mounted at `/api/paywall`.
pub fn paywall_routes() -> Router<AppState> {
    Router::new()
        .route("/check", post(check_access))
        .route("/enforce", post(enforce))
}
