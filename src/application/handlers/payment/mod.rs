//! Payment handlers.

mod get_transaction;
mod process_payment;

pub use get_transaction::{
    transaction_cache_key, GetTransactionHandler, GetTransactionQuery, TRANSACTION_CACHE_TTL,
};
pub use process_payment::{ProcessPaymentCommand, ProcessPaymentHandler};
