//! Oracle access: client, request shape, retry policy, and call spacing
//!
//! Both drivers talk to the oracle exclusively through the [`Oracle`] trait,
//! so tests can substitute a scripted implementation for the HTTP client.

pub mod client;
pub mod retry;

pub use client::OpenAiClient;
pub use retry::RetryManager;

use crate::errors::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// One oracle request: a stage-fixed system instruction plus a per-unit
/// user instruction. The response must be a single JSON object.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// External text-classification/generation service invoked per work unit
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Issue one request and return the raw response text
    async fn complete(&self, request: &OracleRequest) -> Result<String>;
}

/// Enforces a minimum delay between consecutive oracle calls.
///
/// The delay is a hard floor on call spacing regardless of call outcome,
/// including retries of the same unit.
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum inter-call delay
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_call: None,
        }
    }

    /// Wait until at least `min_delay` has passed since the previous call,
    /// then mark the current call as started
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                sleep(self.min_delay - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}
