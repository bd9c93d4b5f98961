//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, request deadlines and the error vocabulary
//! shared by the payment, webhook and paywall domains.

mod deadline;
mod errors;
mod ids;
mod timestamp;

pub use deadline::{Deadline, DeadlineExceeded};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{Action, ContentId, EventId, PlanId, TransactionId, UserId};
pub use timestamp::Timestamp;
