//! HTTP adapters - REST API implementations.
//!
//! Each area has its own adapter module; `router` assembles them under
//! `/api` next to the operational endpoints.

mod error;
mod ops;
pub mod payment;
pub mod paywall;
mod state;
pub mod webhook;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

/// Complete application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/payments", payment::payment_routes())
        .nest("/api/webhooks", webhook::webhook_routes())
        .nest("/api/paywall", paywall::paywall_routes())
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
