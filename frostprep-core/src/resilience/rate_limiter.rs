//! Minimum-spacing rate limiter for outbound LLM calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive calls.
///
/// The mutex is held across the sleep, so concurrent callers queue up and
/// proceed one at a time with at least `min_interval` between them.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until at least `min_interval` has elapsed since the previous
    /// call, then record this call's timestamp.
    pub async fn await_turn(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "rate limiter sleeping");
                tokio::time::sleep(wait).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        let start = Instant::now();
        limiter.await_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        limiter.await_turn().await;
        let start = Instant::now();
        limiter.await_turn().await;

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_passes() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        limiter.await_turn().await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        let start = Instant::now();
        limiter.await_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_elapsed_waits_remainder() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        limiter.await_turn().await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        let start = Instant::now();
        limiter.await_turn().await;
        assert_eq!(start.elapsed(), Duration::from_millis(60));
    }
}
