//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_transaction, process_payment};
use crate::adapters::http::AppState;

/// Mounted at `/api/payments`.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(process_payment))
        .route("/transactions/:id", get(get_transaction))
}
