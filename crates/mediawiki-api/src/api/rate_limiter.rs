//! Minimum-interval rate limiter.
//!
//! Enforces a minimum delay between the end of one request and the start of
//! the next one.

use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Rate limiter holding the configured minimum wait and the last call time
#[derive(Debug, Default)]
pub struct RateLimiter {
    /// Minimum delay between requests, `None` when disabled
    min_wait: Option<Duration>,
    /// Timestamp of the last successful request
    last_call: Option<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter, disabled when `min_wait` is `None`
    pub fn new(min_wait: Option<Duration>) -> Self {
        Self {
            min_wait,
            last_call: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.min_wait.is_some()
    }

    pub fn min_wait(&self) -> Option<Duration> {
        self.min_wait
    }

    /// Replace the configuration and forget the previous call
    pub fn reconfigure(&mut self, min_wait: Option<Duration>) {
        self.min_wait = min_wait;
        self.last_call = None;
    }

    /// Time left before the next request may be sent
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let ready_at = self.last_call? + self.min_wait?;
        ready_at.checked_duration_since(now).filter(|d| !d.is_zero())
    }

    /// Wait until a request can be made
    pub async fn acquire(&self) {
        if let Some(wait_time) = self.remaining(Instant::now()) {
            tracing::debug!(
                wait_ms = wait_time.as_millis(),
                "Rate limit: waiting for minimum interval"
            );
            sleep(wait_time).await;
        }
    }

    /// Record a completed request
    pub fn record(&mut self) {
        if self.is_enabled() {
            self.last_call = Some(Instant::now());
        }
    }
}
