//! HTTP adapter for payment endpoints.
//!
//! - `POST /api/payments` - Process a payment through the circuit breaker
//! - `GET /api/payments/transactions/:id` - Look up a transaction

mod handlers;
mod routes;

pub use handlers::{get_transaction, process_payment};
pub use routes::payment_routes;
