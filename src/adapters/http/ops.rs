//! Operational endpoints: liveness and metrics exposition.

use axum::extract::{Json, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::AppState;

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    let Some(prometheus) = state.prometheus.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match prometheus.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
