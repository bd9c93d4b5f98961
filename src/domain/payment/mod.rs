//! Payment domain - charge requests, transaction records and their errors.

mod errors;
mod request;
mod transaction;

pub use errors::PaymentError;
pub use request::{ChargeRequest, PaymentRequest, PaymentResponse};
pub use transaction::{TransactionRecord, TransactionStatus};
