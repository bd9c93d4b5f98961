//! Domain layer containing business rules and value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, timestamps, deadlines, errors)
//! - `payment` - Charge requests and transaction records
//! - `webhook` - Gateway notifications and signature handling
//! - `paywall` - Subscription entitlement and access verdicts

pub mod foundation;
pub mod payment;
pub mod paywall;
pub mod webhook;
