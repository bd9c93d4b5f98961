//! Webhook domain - gateway event model, signatures and errors.

mod errors;
mod event;
mod signature;

pub use errors::WebhookError;
pub use event::{WebhookEvent, WebhookEventType};
pub use signature::{compute_signature, signature_header, SignatureHeader};
