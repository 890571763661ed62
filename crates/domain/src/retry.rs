// Rust guideline compliant 2026-10-18

//! Bounded retry around calls to external ports.
//!
//! Only the auditor and forecasting-engine calls go through a
//! [`RetryPolicy`]. Forecast cache writes are not idempotent and are never
//! retried.

use std::fmt::Display;
use std::time::Duration;

/// Fixed-backoff retry policy: at most `max_retries` extra attempts,
/// sleeping `backoff` between two attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry.
    #[must_use]
    pub const fn none() -> Self {
        Self { max_retries: 0, backoff: Duration::ZERO }
    }

    /// Up to `max_retries` retries after the first attempt.
    #[must_use]
    pub const fn new(max_retries: u32, backoff: Duration) -> Self {
        Self { max_retries, backoff }
    }

    /// Number of retries allowed after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay between two attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Run `attempt` until it succeeds, the error is not retryable, or the
    /// retry budget is spent.
    ///
    /// `operation` names the call in the `retry.scheduled` log event.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `attempt`.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        is_retryable: impl Fn(&E) -> bool,
        mut attempt: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries = 0u32;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if retries < self.max_retries && is_retryable(&e) => {
                    retries += 1;
                    tracing::warn!(operation, retry = retries, error = %e, "retry.scheduled");
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
