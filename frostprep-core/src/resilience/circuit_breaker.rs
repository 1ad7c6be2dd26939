//! Circuit breaker guarding the LLM provider.
//!
//! Counts consecutive failures and opens once a threshold is reached. While
//! open, calls are rejected without touching the provider. Halfway through
//! the cooldown a single probe call is allowed through; a full cooldown
//! closes the breaker outright.

use std::time::Duration;

use tokio::time::Instant;

/// Breaker state. HalfOpen means one probe is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Consecutive-failure circuit breaker.
///
/// Not internally synchronized; callers wrap it in a mutex so that the
/// check and the subsequent state transition are atomic.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    state: BreakerState,
    failures: u32,
    last_failure: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            state: BreakerState::Closed,
            failures: 0,
            last_failure: None,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failures
    }

    /// Decide whether a call may proceed.
    ///
    /// `first_attempt` is true only for the first try of an invocation;
    /// retries of the same invocation never qualify as the half-open probe.
    pub fn check(&mut self, first_attempt: bool) -> bool {
        match self.state {
            BreakerState::Closed => true,
            // A probe is already in flight; no second caller slips through.
            BreakerState::HalfOpen => false,
            BreakerState::Open => {
                let elapsed = match self.last_failure {
                    Some(at) => at.elapsed(),
                    None => return true,
                };

                if elapsed >= self.cooldown {
                    tracing::info!("circuit breaker cooldown elapsed, closing");
                    self.reset();
                    return true;
                }

                if elapsed >= self.cooldown / 2 && first_attempt {
                    tracing::info!("circuit breaker half-open, allowing probe");
                    self.state = BreakerState::HalfOpen;
                    return true;
                }

                false
            }
        }
    }

    /// Record a successful call. Closes the breaker and clears the count.
    pub fn on_success(&mut self) {
        self.failures = 0;
        self.last_failure = None;
        self.state = BreakerState::Closed;
    }

    /// Record a failed call. Opens the breaker at the threshold.
    pub fn on_failure(&mut self) {
        self.failures += 1;
        self.last_failure = Some(Instant::now());

        if self.failures >= self.threshold {
            if self.state != BreakerState::Open {
                tracing::warn!(failures = self.failures, "circuit breaker opened");
            }
            self.state = BreakerState::Open;
        } else if self.state == BreakerState::HalfOpen {
            // Failed probe reopens immediately.
            tracing::warn!("circuit breaker probe failed, reopening");
            self.state = BreakerState::Open;
        }
    }

    /// Manually close the breaker and clear all failure history.
    pub fn reset(&mut self) {
        self.failures = 0;
        self.last_failure = None;
        self.state = BreakerState::Closed;
    }
}
