use log::debug;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::CoreError;

/// Exponential backoff parameters.
///
/// The delay before attempt `k` (0-indexed, `k ≥ 1`) is
/// `min(initial_delay × multiplier^(k-1), max_delay)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_retries: u32,

    pub initial_delay_ms: u64,

    pub max_delay_ms: u64,

    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay to wait before attempt `attempt`. Attempt 0 starts immediately.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let uncapped = self.initial_delay_ms as f64 * self.multiplier.powi(exponent);
        let capped = uncapped.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(CoreError::ValidationError(format!(
                "retry multiplier must be a finite number >= 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent.
///
/// Cancellation is checked before every attempt and raced against both the
/// attempt and the backoff sleep; it always surfaces as [`CoreError::Cancelled`].
/// When the budget runs out the last error is returned. A `max_retries` of 0
/// still makes one attempt.
pub async fn retry_with_backoff<T, F, Fut, P>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    is_retryable: P,
    mut operation: F,
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
    P: Fn(&CoreError) -> bool,
{
    let attempts = config.max_retries.max(1);
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Cancelled),
            result = operation() => result,
        };

        let error = match result {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if error.is_cancellation() || !is_retryable(&error) {
            return Err(error);
        }

        attempt += 1;
        if attempt >= attempts {
            debug!("Giving up after {attempts} attempt(s): {error}");
            return Err(error);
        }

        let delay = config.delay_for_attempt(attempt);
        debug!(
            "Attempt {attempt}/{attempts} failed ({error}); retrying in {} ms",
            delay.as_millis()
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
