//! HTTP adapter for gateway webhooks.
//!
//! - `POST /api/webhooks/payments` - Verify, store and acknowledge a delivery
//!
//! No user authentication; deliveries are verified by signature.

mod handlers;
mod routes;

pub use handlers::{handle_payment_webhook, SIGNATURE_HEADER};
pub use routes::webhook_routes;
