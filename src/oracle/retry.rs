//! Bounded retry with exponential backoff
//!
//! Transient oracle errors are retried up to a fixed bound with doubling,
//! capped, jittered delays. The backoff policy is independent of the call
//! site: drivers hand the manager a closure and degrade to a per-unit
//! failure marker when the bound is exhausted.

use crate::errors::{PipelineError, Result};
use std::time::Duration;
use tokio::time::sleep;

/// Default number of attempts per work unit
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (1 second)
const BASE_DELAY_MS: u64 = 1000;

/// Maximum delay cap (16 seconds)
const MAX_DELAY_MS: u64 = 16_000;

/// Retry manager with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryManager {
    /// Total attempts per operation (first try included)
    max_attempts: u32,

    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum delay cap in milliseconds
    max_delay_ms: u64,

    /// Enable jitter
    enable_jitter: bool,
}

impl Default for RetryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryManager {
    /// Create a retry manager with default settings
    pub fn new() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay_ms: BASE_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
            enable_jitter: true,
        }
    }

    /// Create a retry manager with custom settings
    pub fn with_config(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms,
            enable_jitter: true,
        }
    }

    /// Execute an operation, retrying transient failures
    pub async fn execute_with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable(&e) {
                        return Err(e);
                    }

                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(e);
                    }

                    sleep(self.calculate_delay(attempt)).await;
                }
            }
        }
    }

    /// Delay before the given retry attempt (attempt numbering starts at 1)
    fn calculate_delay(&self, attempt: u32) -> Duration {
        // Binary exponential backoff, capped
        let exponential = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let delay_ms = exponential.min(self.max_delay_ms);

        // ±25% jitter
        let final_delay = if self.enable_jitter {
            let jitter = (delay_ms / 4) as i64;
            let random_jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter as f64;
            ((delay_ms as i64) + random_jitter as i64).max(0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }

    /// Get max attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Whether an error is transient and worth retrying.
///
/// Timeouts, HTTP failures, throttling, and malformed responses are
/// transient; setup and data errors are not.
pub fn is_retryable(error: &PipelineError) -> bool {
    match error {
        PipelineError::HttpError(_) => true,
        PipelineError::OracleApiError(_) => true,
        PipelineError::RateLimited(_) => true,
        PipelineError::MalformedResponse(_) => true,

        PipelineError::ConfigError(_) => false,
        PipelineError::InputError(_) => false,
        PipelineError::CredentialError(_) => false,
        PipelineError::CsvError(_) => false,
        PipelineError::IoError(_) => false,
    }
}
