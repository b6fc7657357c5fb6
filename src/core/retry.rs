//! Fixed-schedule retry with backoff
//!
//! The first attempt runs immediately. Each failure sleeps for the next
//! interval of the policy before trying again, so a policy of
//! `max_retries = 3` with `[1s, 2s, 4s]` makes at most four attempts.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::events::{Event, EventSink};

/// Injected delay so tests can observe the backoff sequence without waiting.
pub(crate) type SleepFn = Arc<dyn Fn(Duration) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) max_retries: usize,
    pub(crate) intervals: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            intervals: vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ],
        }
    }
}

impl RetryPolicy {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.intervals.len() < self.max_retries {
            return Err(format!(
                "intervals length ({}) is less than max_retries ({})",
                self.intervals.len(),
                self.max_retries
            ));
        }
        Ok(())
    }

    pub(crate) fn total_attempts(&self) -> usize {
        self.max_retries + 1
    }
}

#[derive(Debug, Error)]
pub(crate) enum RetryError<E: std::error::Error + 'static> {
    #[error("invalid retry policy for {operation}: {reason}")]
    InvalidPolicy { operation: String, reason: String },

    #[error("{operation} failed after {attempts} attempts: {source}")]
    Exhausted {
        operation: String,
        attempts: usize,
        #[source]
        source: E,
    },
}

#[derive(Clone)]
pub(crate) struct Backoff {
    policy: RetryPolicy,
    sleep: SleepFn,
    sink: Arc<dyn EventSink>,
}

impl Backoff {
    pub(crate) fn new(policy: RetryPolicy, sink: Arc<dyn EventSink>) -> Self {
        Self {
            policy,
            sleep: Arc::new(std::thread::sleep),
            sink,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_sleep(mut self, sleep: SleepFn) -> Self {
        self.sleep = sleep;
        self
    }

    pub(crate) fn execute<T, E, F>(&self, operation: &str, mut f: F) -> Result<T, RetryError<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut() -> Result<T, E>,
    {
        if let Err(reason) = self.policy.validate() {
            return Err(RetryError::InvalidPolicy {
                operation: operation.to_string(),
                reason,
            });
        }

        let total = self.policy.total_attempts();
        let mut attempt = 1;
        loop {
            let err = match f() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= total {
                self.sink.emit(Event::RetriesExhausted {
                    operation: operation.to_string(),
                    attempts: total,
                    error: err.to_string(),
                });
                return Err(RetryError::Exhausted {
                    operation: operation.to_string(),
                    attempts: total,
                    source: err,
                });
            }

            let delay = self.policy.intervals[attempt - 1];
            self.sink.emit(Event::RetryScheduled {
                operation: operation.to_string(),
                attempt,
                total,
                delay,
                error: err.to_string(),
            });
            (self.sleep)(delay);
            attempt += 1;
        }
    }
}
