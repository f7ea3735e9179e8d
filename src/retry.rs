//! Bounded retry policy for the network-facing transfer steps
use std::future::Future;
use std::time::Duration;

use log::warn;
use tokio::time::sleep;

use crate::errors::OrgMoverError;

/// Fixed-backoff retry: at most `max_attempts` tries, pausing `backoff`
/// between them. Applied to the clone and push steps only.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts (not retries after the first).
    pub max_attempts: u32,

    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Drive `op` until it succeeds or attempts are exhausted, returning
    /// the last error in that case.
    /// # Errors
    /// The error of the final attempt
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, OrgMoverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OrgMoverError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        "{what} attempt {attempt}/{} failed, retrying: {e}",
                        self.max_attempts
                    );
                    attempt += 1;
                    sleep(self.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
