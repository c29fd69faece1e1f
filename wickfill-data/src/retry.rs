//! Retry with multiplicative backoff for flaky exchange calls.

use std::time::Duration;

use tracing::warn;

use crate::provider::DataError;

/// Backoff schedule: `initial_delay` before the first retry, multiplied by
/// `backoff_factor` before each subsequent one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_factor: 1.5,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay slept before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay
            .mul_f64(self.backoff_factor.powi(retry as i32))
    }

    /// Run `op` up to `max_retries` times, sleeping between attempts.
    ///
    /// The last error is returned once every attempt has failed.
    pub fn run<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, DataError>,
    ) -> Result<T, DataError> {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    warn!(what, attempt, %err, "attempt failed");
                    if attempt >= self.max_retries {
                        return Err(err);
                    }
                    std::thread::sleep(self.delay_for(attempt - 1));
                }
            }
        }
    }
}
