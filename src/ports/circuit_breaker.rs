//! CircuitBreaker port - Shields calls to the payment gateway.
//!
//! ## States
//!
//! - **Closed**: Normal operation, calls flow through
//! - **Open**: Threshold reached, calls rejected without touching the gateway
//! - **Half-Open**: Recovery timeout elapsed, trial calls allowed
//!
//! ## Transitions
//!
//! ```text
//! Closed    --[consecutive failures reach threshold]--> Open
//! Open      --[first can_execute after recovery_timeout]--> HalfOpen
//! HalfOpen  --[any success]--> Closed
//! HalfOpen  --[any failure]--> Open
//! ```
//!
//! A success in any state resets the failure count and closes the circuit.
//! The breaker never calls the dependency itself; callers gate their own call
//! with `can_execute` and report the outcome.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - requests flow through to the service.
    Closed,

    /// Too many failures - requests rejected immediately without calling service.
    Open,

    /// Probation after the recovery timeout - trial requests allowed.
    HalfOpen,
}

impl CircuitState {
    /// Check if the circuit allows requests through.
    pub fn allows_requests(&self) -> bool {
        matches!(self, CircuitState::Closed | CircuitState::HalfOpen)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the breaker.
    ///
    /// Default: 5 failures
    pub failure_threshold: u32,

    /// How long the breaker stays open before admitting a trial call.
    ///
    /// Default: 60 seconds
    pub recovery_timeout: Duration,

    /// Cap on trial calls admitted while half-open.
    ///
    /// `None` admits every caller once half-open. Default: None
    pub half_open_trial_count: Option<u32>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::for_payment_gateway()
    }
}

impl CircuitBreakerConfig {
    pub fn for_payment_gateway() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            half_open_trial_count: None,
        }
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }

    pub fn with_half_open_trial_count(mut self, count: Option<u32>) -> Self {
        self.half_open_trial_count = count;
        self
    }
}

/// Port for circuit breaker functionality.
///
/// # Example
///
/// ```ignore
/// if !breaker.can_execute() {
///     return Err(PaymentError::ServiceUnavailable);
/// }
/// match gateway.charge(&charge).await {
///     Ok(outcome) => {
///         breaker.record_success();
///         Ok(outcome)
///     }
///     Err(e) => {
///         breaker.record_failure();
///         Err(e.into())
///     }
/// }
/// ```
pub trait CircuitBreaker: Send + Sync {
    /// Get the current state of the circuit.
    fn state(&self) -> CircuitState;

    /// Check if a call may proceed.
    ///
    /// While open, the first caller at or after the recovery timeout flips the
    /// circuit to half-open and is admitted.
    fn can_execute(&self) -> bool;

    /// Record a successful call. Closes the circuit and clears failures.
    fn record_success(&self);

    /// Record a failed call. Trips the breaker at the threshold; re-opens it
    /// from half-open.
    fn record_failure(&self);

    /// Force reset the circuit to closed state.
    fn reset(&self);

    /// Get metrics about the circuit breaker.
    fn metrics(&self) -> CircuitBreakerMetrics;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitBreakerMetrics {
    pub state: CircuitState,

    /// Total successful calls since creation
    pub total_successes: u64,

    /// Total failed calls since creation
    pub total_failures: u64,

    /// Times the circuit has opened
    pub times_opened: u64,

    /// Calls rejected while open
    pub total_rejections: u64,

    pub consecutive_failures: u32,

    /// Time until circuit admits a trial call (when open)
    #[serde(skip)]
    pub time_until_half_open: Option<Duration>,
}
