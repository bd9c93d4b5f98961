//! Request-scoped deadline propagated into every external call.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline exceeded")]
pub struct DeadlineExceeded;

/// Point in time by which the inbound request must be answered.
///
/// Gateway and store calls are wrapped in [`Deadline::run`]; a call that
/// outlives the deadline is abandoned and reported as `DeadlineExceeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    /// A deadline that never fires. Used by background work with no caller.
    pub fn unbounded() -> Self {
        Self { at: None }
    }

    /// Tightens this deadline to at most `timeout` from now.
    pub fn capped(self, timeout: Duration) -> Self {
        let cap = Instant::now() + timeout;
        match self.at {
            Some(at) if at <= cap => self,
            _ => Self { at: Some(cap) },
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.remaining(), Some(d) if d.is_zero())
    }

    /// Drives `fut` to completion or until the deadline passes.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, DeadlineExceeded>
    where
        F: Future,
    {
        match self.at {
            Some(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| DeadlineExceeded),
            None => Ok(fut.await),
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn run_returns_output_before_deadline() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let out = deadline.run(async { 7 }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn run_fails_when_future_outlives_deadline() {
        let deadline = Deadline::after(Duration::from_millis(50));
        let out = deadline
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert_eq!(out, Err(DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_deadline_never_fires() {
        let deadline = Deadline::unbounded();
        assert_eq!(deadline.remaining(), None);
        let out = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                "done"
            })
            .await;
        assert_eq!(out, Ok("done"));
    }

    #[tokio::test(start_paused = true)]
    async fn capped_keeps_the_earlier_deadline() {
        let tight = Deadline::after(Duration::from_millis(10));
        assert_eq!(tight.capped(Duration::from_secs(10)), tight);

        let loose = Deadline::unbounded().capped(Duration::from_secs(2));
        assert_eq!(loose.remaining(), Some(Duration::from_secs(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_time_advances() {
        let deadline = Deadline::after(Duration::from_secs(1));
        assert!(!deadline.is_expired());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(deadline.is_expired());
    }
}
