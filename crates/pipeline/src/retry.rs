//! Bounded exponential-backoff retry for generation calls.
//!
//! [`RetryPolicy::execute`] runs an operation up to `max_attempts` times,
//! sleeping between attempts with a delay that starts at `initial_delay`
//! and doubles after every failure. Both the operation and the sleep are
//! raced against a [`CancellationToken`]; cancellation is reported as
//! [`RetryError::Cancelled`] and never counts as a failed attempt.

use std::future::Future;
use std::time::Duration;

use dailystory_core::generation::GenerationError;
use tokio_util::sync::CancellationToken;

/// Default number of attempts per logical generation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the second attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(10);

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `0` behaves like `1`.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub initial_delay: Duration,
    /// Upper bound on any single delay. `None` leaves the backoff uncapped.
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: GenerationError,
    },

    #[error("Cancelled while retrying")]
    Cancelled,
}

impl RetryPolicy {
    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    /// Delay that follows `current`: doubled, then capped.
    pub fn next_delay(&self, current: Duration) -> Duration {
        self.cap(current.saturating_mul(2))
    }

    /// The full sequence of waits between attempts.
    pub fn delays(&self) -> Vec<Duration> {
        let waits = self.max_attempts.max(1) - 1;
        let mut delay = self.cap(self.initial_delay);
        let mut out = Vec::with_capacity(waits as usize);
        for _ in 0..waits {
            out.push(delay);
            delay = self.next_delay(delay);
        }
        out
    }

    /// Run `operation` until it succeeds, attempts run out, or `cancel` fires.
    ///
    /// `operation` receives the 1-based attempt number. Intermediate failures
    /// are logged at warn, the final one at error.
    pub async fn execute<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.cap(self.initial_delay);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                result = operation(attempt) => result,
            };

            match result {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "Generation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::error!(attempt, error = %e, "Generation failed, no attempts left");
                    return Err(RetryError::Exhausted { attempts: attempt, last: e });
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Generation attempt failed, retrying",
                    );
                }
            }

            // Wait before the next attempt, respecting cancellation.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }

            delay = self.next_delay(delay);
        }
    }
}
