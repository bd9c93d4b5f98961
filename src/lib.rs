//! paywall-core - Resilience and access-decision core for a billing backend
//!
//! Guards an external payment gateway with a circuit breaker, ingests signed
//! gateway webhooks through a bounded worker pool, and decides per request
//! whether a subject may use premium content under rate limits and a daily
//! usage quota.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
