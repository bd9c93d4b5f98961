//! HTTP adapter for paywall endpoints.
//!
//! - `POST /api/paywall/check` - Subscription-only access check (cached)
//! - `POST /api/paywall/enforce` - Rate limit, subscription and usage, counting the use
//!
//! Both answer 200 with a verdict; only collaborator failures are errors.

pub mod dto;
mod handlers;
mod routes;

pub use dto::{CheckAccessRequest, EnforceRequest};
pub use handlers::{check_access, enforce};
pub use routes::paywall_routes;
