//! Resilience layer for outbound LLM calls.
//!
//! Every provider call goes through the [`ResilientInvoker`], which stacks
//! three protections in order: circuit breaker check, rate limiter spacing,
//! then retry with exponential backoff. Failure classification is opaque;
//! any provider error counts toward the breaker.

mod circuit_breaker;
mod rate_limiter;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use rate_limiter::RateLimiter;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::CoreConfig;
use crate::llm::LlmError;

/// Error type for resilient invocations.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Circuit breaker is open, request rejected")]
    CircuitOpen,

    #[error("All {attempts} attempts failed: {source}")]
    RetriesExhausted { attempts: u32, source: LlmError },
}

/// Wraps provider calls with circuit breaking, rate limiting, and retry.
///
/// Cloning is cheap; clones share the same breaker and limiter, so all
/// callers in a process see one failure budget and one call spacing.
#[derive(Debug, Clone)]
pub struct ResilientInvoker {
    max_retries: u32,
    base_delay: Duration,
    breaker: Arc<Mutex<CircuitBreaker>>,
    limiter: Arc<RateLimiter>,
}

impl ResilientInvoker {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.base_delay,
            breaker: Arc::new(Mutex::new(CircuitBreaker::new(
                config.breaker_threshold,
                config.breaker_cooldown,
            ))),
            limiter: Arc::new(RateLimiter::new(config.rate_limit_interval)),
        }
    }

    /// Run `op` with up to `max_retries` attempts.
    ///
    /// The breaker is consulted before every attempt and a rejection aborts
    /// the whole invocation without further retries. Backoff between
    /// attempt `n` and `n + 1` is `base_delay * 2^n`.
    pub async fn invoke<T, F, Fut>(&self, mut op: F) -> Result<T, InvokeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            // Check and transition under one lock so two tasks cannot both
            // claim the half-open probe slot.
            let allowed = self.breaker.lock().await.check(attempt == 0);
            if !allowed {
                tracing::warn!(attempt, "circuit breaker rejected call");
                return Err(InvokeError::CircuitOpen);
            }

            self.limiter.await_turn().await;

            match op().await {
                Ok(value) => {
                    self.breaker.lock().await.on_success();
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "LLM call failed");
                    self.breaker.lock().await.on_failure();

                    let is_last = attempt + 1 == self.max_retries;
                    if !is_last {
                        let delay = self.base_delay * 2u32.pow(attempt);
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(InvokeError::RetriesExhausted {
            attempts: self.max_retries,
            source: last_error
                .unwrap_or_else(|| LlmError::RequestFailed("no attempts were made".to_string())),
        })
    }

    /// Current breaker state, for diagnostics.
    pub async fn breaker_state(&self) -> BreakerState {
        self.breaker.lock().await.state()
    }

    /// Manually close the breaker, e.g. after an operator intervenes.
    pub async fn reset_breaker(&self) {
        self.breaker.lock().await.reset();
        tracing::info!("circuit breaker manually reset");
    }
}
