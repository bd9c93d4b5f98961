//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresTransactionRepository` - `payment_transactions` table
//! - `PostgresWebhookEventRepository` - `webhook_events` table, idempotent on event id
//! - `PostgresSubscriptionLookup` - newest active row in `subscriptions`

mod subscription_lookup;
mod transaction_repository;
mod webhook_event_repository;

pub use subscription_lookup::PostgresSubscriptionLookup;
pub use transaction_repository::PostgresTransactionRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;
