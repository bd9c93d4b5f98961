//! In-memory adapters for tests and single-process development.
//!
//! Each store can be switched into a failing mode to exercise the error
//! paths of the handlers that call it.

mod subscription_lookup;
mod transaction_repository;
mod webhook_event_repository;

pub use subscription_lookup::InMemorySubscriptionLookup;
pub use transaction_repository::InMemoryTransactionRepository;
pub use webhook_event_repository::InMemoryWebhookEventRepository;
