// ============================================================
// Layer 4: Retry With Linear Backoff
// ============================================================
// Wraps a fallible operation and calls it up to `max_retries`
// times. Between attempts it sleeps `attempt * base_delay`:
//
//   attempt 1 fails → sleep 1 × base
//   attempt 2 fails → sleep 2 × base
//   attempt 3 fails → error returned to the caller
//
// Retries block the calling thread. The mining pipeline is
// strictly sequential, so nothing else is waiting on us.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_retries: u32,
    /// Unit of the linear backoff
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Run `op` until it succeeds or the attempt budget is spent.
/// The closure receives the 1-based attempt number.
/// The last attempt's error is returned unchanged.
pub fn with_retry<T, E, F>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let attempts = policy.max_retries.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    "Attempt {}/{} failed: {} (retrying in {:?})",
                    attempt, attempts, err, delay
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
