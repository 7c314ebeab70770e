use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::errors::InferenceError;

/// Outcome of one request attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Done(T),
    /// HTTP 429; the only outcome that is retried.
    RateLimited,
    Failed(InferenceError),
}

/// Bounded retry with exponential backoff, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: u32) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    /// Wait after rate-limited attempt `attempt` (1-based): `backoff_factor^(attempt-1)` seconds.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let secs = u64::from(self.backoff_factor).saturating_pow(attempt.saturating_sub(1));
        Duration::from_secs(secs)
    }

    /// Drives `attempt_fn` with attempt numbers `1..=max_retries` until it succeeds,
    /// fails for a reason other than rate limiting, or the attempts run out.
    pub async fn run<T, F, Fut>(&self, mut attempt_fn: F) -> Result<T, InferenceError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let max_attempts = self.max_retries.max(1);
        let mut attempt = 1;
        loop {
            match attempt_fn(attempt).await {
                Attempt::Done(value) => return Ok(value),
                Attempt::Failed(err) => return Err(err),
                Attempt::RateLimited if attempt < max_attempts => {
                    let wait = self.backoff(attempt);
                    warn!(
                        "⏳ Rate limited (attempt {}/{}), retrying in {}s",
                        attempt,
                        max_attempts,
                        wait.as_secs()
                    );
                    sleep(wait).await;
                    attempt += 1;
                }
                Attempt::RateLimited => {
                    warn!("❌ Rate limited on final attempt {}", attempt);
                    return Err(InferenceError::RateLimited { attempts: attempt });
                }
            }
        }
    }
}
