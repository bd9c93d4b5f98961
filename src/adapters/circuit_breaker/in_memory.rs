//! Mutex-guarded circuit breaker.
//!
//! State, consecutive failure count, last failure time and half-open
//! admissions are read and written together under one lock, so every
//! transition is linearizable. The lock is never held across the guarded call.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::foundation::Timestamp;
use crate::ports::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState, Clock,
    PaywallMetrics,
};

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure_time: Option<Timestamp>,
    half_open_admitted: u32,
    total_successes: u64,
    total_failures: u64,
    total_rejections: u64,
    times_opened: u64,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_time: None,
            half_open_admitted: 0,
            total_successes: 0,
            total_failures: 0,
            total_rejections: 0,
            times_opened: 0,
        }
    }

    fn open(&mut self, now: Timestamp) {
        self.state = CircuitState::Open;
        self.last_failure_time = Some(now);
        self.half_open_admitted = 0;
        self.times_opened += 1;
    }
}

pub struct InMemoryCircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<dyn PaywallMetrics>>,
}

impl InMemoryCircuitBreaker {
    pub fn new(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState::new()),
            clock,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PaywallMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // A panic while holding the lock cannot leave the fields half-written
        // in a way later calls can't handle, so poisoning is ignored.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn recovery_elapsed(&self, inner: &BreakerState, now: Timestamp) -> bool {
        match inner.last_failure_time {
            Some(at) => now
                .duration_since(&at)
                .to_std()
                .map(|elapsed| elapsed >= self.config.recovery_timeout)
                .unwrap_or(false),
            None => true,
        }
    }

    fn transitioned(&self, from: CircuitState, to: CircuitState) {
        if from == to {
            return;
        }
        tracing::warn!(
            breaker = %self.name,
            from = %from,
            to = %to,
            "Circuit breaker state changed"
        );
        if let Some(metrics) = &self.metrics {
            metrics.breaker_transition(to.as_str());
        }
    }
}

impl CircuitBreaker for InMemoryCircuitBreaker {
    fn state(&self) -> CircuitState {
        self.lock().state
    }

    fn can_execute(&self) -> bool {
        let now = self.clock.now();
        let (allowed, from, to) = {
            let mut inner = self.lock();
            let from = inner.state;
            let allowed = match inner.state {
                CircuitState::Closed => true,
                CircuitState::Open => {
                    if self.recovery_elapsed(&inner, now) {
                        inner.state = CircuitState::HalfOpen;
                        inner.half_open_admitted = 1;
                        true
                    } else {
                        false
                    }
                }
                CircuitState::HalfOpen => match self.config.half_open_trial_count {
                    Some(cap) if inner.half_open_admitted >= cap => false,
                    _ => {
                        inner.half_open_admitted = inner.half_open_admitted.saturating_add(1);
                        true
                    }
                },
            };
            if !allowed {
                inner.total_rejections += 1;
            }
            (allowed, from, inner.state)
        };

        self.transitioned(from, to);
        allowed
    }

    fn record_success(&self) {
        let from = {
            let mut inner = self.lock();
            let from = inner.state;
            inner.total_successes += 1;
            inner.consecutive_failures = 0;
            inner.half_open_admitted = 0;
            inner.state = CircuitState::Closed;
            from
        };
        self.transitioned(from, CircuitState::Closed);
    }

    fn record_failure(&self) {
        let now = self.clock.now();
        let (from, to) = {
            let mut inner = self.lock();
            let from = inner.state;
            inner.total_failures += 1;
            inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);

            match inner.state {
                CircuitState::Closed => {
                    if inner.consecutive_failures >= self.config.failure_threshold {
                        inner.open(now);
                    }
                }
                CircuitState::HalfOpen => inner.open(now),
                // A late failure from a call admitted before the trip.
                CircuitState::Open => inner.last_failure_time = Some(now),
            }
            (from, inner.state)
        };
        self.transitioned(from, to);
    }

    fn reset(&self) {
        let from = {
            let mut inner = self.lock();
            let from = inner.state;
            inner.state = CircuitState::Closed;
            inner.consecutive_failures = 0;
            inner.half_open_admitted = 0;
            inner.last_failure_time = None;
            from
        };
        self.transitioned(from, CircuitState::Closed);
    }

    fn metrics(&self) -> CircuitBreakerMetrics {
        let now = self.clock.now();
        let inner = self.lock();

        let time_until_half_open = match (inner.state, inner.last_failure_time) {
            (CircuitState::Open, Some(at)) => {
                let elapsed = now.duration_since(&at).to_std().unwrap_or_default();
                Some(self.config.recovery_timeout.saturating_sub(elapsed))
            }
            _ => None,
        };

        CircuitBreakerMetrics {
            state: inner.state,
            total_successes: inner.total_successes,
            total_failures: inner.total_failures,
            times_opened: inner.times_opened,
            total_rejections: inner.total_rejections,
            consecutive_failures: inner.consecutive_failures,
            time_until_half_open,
        }
    }
}

impl std::fmt::Debug for InMemoryCircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
