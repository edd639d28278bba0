use crate::{Error, Result};
use std::{fmt::Display, future::Future, time::Duration};
use tracing::{debug, error, warn};

/// Exponential backoff: `initial_delay`, then multiplied by
/// `backoff_multiplier` after every failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_multiplier: f64) -> Result<Self> {
        if max_attempts < 1 {
            return Err(Error::invalid_input("max_attempts must be at least 1"));
        }
        if !backoff_multiplier.is_finite() || backoff_multiplier < 0.0 {
            return Err(Error::invalid_input(
                "backoff_multiplier must be a non-negative number",
            ));
        }

        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_multiplier,
        })
    }

    /// Delay awaited after the given failed attempt (1-based). Saturates at
    /// `Duration::MAX` instead of overflowing.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Retries on every failure.
    pub async fn run<F, Fut, T, E>(&self, name: &str, op: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        self.run_if(name, op, |_| true).await
    }

    /// Retries only failures accepted by `retryable`; anything else is
    /// returned at once. After the last attempt the last failure is returned
    /// unchanged.
    pub async fn run_if<F, Fut, T, E, P>(
        &self,
        name: &str,
        mut op: F,
        retryable: P,
    ) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 1;

        loop {
            debug!("Attempt {}/{} for {}", attempt, self.max_attempts, name);

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !retryable(&e) => return Err(e),
                Err(e) if attempt >= self.max_attempts => {
                    error!("All {} attempts failed for {}", self.max_attempts, name);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "Attempt {} failed for {}: {}. Retrying in {:.1}s...",
                        attempt,
                        name,
                        e,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
