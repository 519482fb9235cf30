//! Retry logic with exponential backoff for outbound HTTP calls
//!
//! Used by the OpenAI-compatible adapter and the pricing fetcher:
//! - Exponential backoff with up to 10% jitter, capped at `max_delay`
//! - Rate limits wait at least the server-provided Retry-After
//! - Per-attempt timeout plus an overall deadline

use crate::error::{LlmError, LlmResult};
use crate::logging::{log_debug, log_error};

use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Retry policy configuration for outbound requests
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (1 = no retries)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total operation time
    pub total_timeout: Duration,
    /// Timeout for each individual attempt
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            backoff_multiplier: 2.0,
            total_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Runs an async operation under a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub(crate) struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Execute `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt/time budget runs out.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> LlmResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = LlmResult<T>>,
    {
        let start_time = Instant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = tokio::time::timeout(self.policy.request_timeout, operation()).await;
            let error = match outcome {
                Ok(Ok(value)) => {
                    log_debug!(
                        attempt = attempt,
                        duration_ms = start_time.elapsed().as_millis() as u64,
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Ok(Err(error)) => error,
                Err(_elapsed) => LlmError::timeout(self.policy.request_timeout.as_secs()),
            };

            let delay = self.delay_for(attempt, &error);
            let out_of_time = start_time.elapsed() + delay >= self.policy.total_timeout;

            if !error.is_retryable() || attempt >= max_attempts || out_of_time {
                log_error!(
                    attempts = attempt,
                    total_duration_ms = start_time.elapsed().as_millis() as u64,
                    error = %error,
                    "Request failed after retry handling"
                );
                return Err(error);
            }

            log_debug!(
                attempt = attempt,
                max_attempts = max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Request failed, retrying after delay"
            );
            sleep(delay).await;
        }
    }

    /// Backoff delay after `attempt` failed with `error`
    pub fn delay_for(&self, attempt: u32, error: &LlmError) -> Duration {
        let backoff = self.calculate_delay(attempt);
        match error {
            LlmError::RateLimitExceeded {
                retry_after_seconds,
            } => backoff.max(Duration::from_secs(*retry_after_seconds)),
            _ => backoff,
        }
    }

    /// Exponential backoff with jitter
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_seconds = self.policy.initial_delay.as_secs_f64()
            * self.policy.backoff_multiplier.powi(exponent);
        let capped = delay_seconds.min(self.policy.max_delay.as_secs_f64());

        let jitter = fastrand::f64() * 0.1;
        Duration::from_secs_f64(capped * (1.0 + jitter))
    }
}
