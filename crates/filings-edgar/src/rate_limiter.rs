//! Minimum-interval rate limiting for outbound requests.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::trace;

use crate::config::DEFAULT_RATE_LIMIT;

/// Rate limiter to ensure we don't exceed SEC's rate limits.
///
/// Every call to [`wait_if_needed`](Self::wait_if_needed) returns no earlier
/// than `min_interval` after the previous call returned. The check, the sleep
/// and the timestamp update all happen under one lock, so callers sharing a
/// limiter are serialized rather than racing on a stale timestamp.
#[derive(Debug)]
pub struct RateLimiter {
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_interval,
        }
    }

    /// Returns the configured minimum interval.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the minimum interval has elapsed since the previous call.
    pub async fn wait_if_needed(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                trace!(?delay, "Rate limiting outbound request");
                sleep(delay).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT)
    }
}
