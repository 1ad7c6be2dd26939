//! Core configuration, read once at construction.

use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Default total attempts per invocation.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Default minimum spacing between outbound generative calls.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 100;

/// Default consecutive-failure threshold before the breaker opens.
pub const DEFAULT_BREAKER_THRESHOLD: u32 = 10;

/// Default breaker cooldown.
pub const DEFAULT_BREAKER_COOLDOWN_MS: u64 = 30_000;

/// Valid ranges and budgets for recipe validation.
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    /// Prep time in minutes.
    pub prep_time: RangeInclusive<u32>,
    /// Cook time in minutes.
    pub cook_time: RangeInclusive<u32>,
    pub servings: RangeInclusive<u32>,
    /// Freezer storage time in days.
    pub storage_time: RangeInclusive<u32>,
    /// Maximum description length in characters.
    pub description_budget: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            prep_time: 5..=120,
            cook_time: 5..=180,
            servings: 1..=12,
            storage_time: 1..=180,
            description_budget: 150,
        }
    }
}

/// Configuration for the resilience layer and validation rules.
///
/// Loaded from the environment once; components take what they need at
/// construction and never re-read it.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Total attempts per invocation, including the first.
    pub max_retries: u32,
    /// Base delay for exponential backoff (`base_delay * 2^attempt`).
    pub base_delay: Duration,
    /// Minimum spacing between outbound calls.
    pub rate_limit_interval: Duration,
    /// Consecutive failures before the circuit opens.
    pub breaker_threshold: u32,
    /// How long the circuit stays open; a probe is allowed at half this.
    pub breaker_cooldown: Duration,
    pub limits: ValidationLimits,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            rate_limit_interval: Duration::from_millis(DEFAULT_RATE_LIMIT_MS),
            breaker_threshold: DEFAULT_BREAKER_THRESHOLD,
            breaker_cooldown: Duration::from_millis(DEFAULT_BREAKER_COOLDOWN_MS),
            limits: ValidationLimits::default(),
        }
    }
}

impl CoreConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset:
    ///
    /// - `FROSTPREP_MAX_RETRIES`
    /// - `FROSTPREP_BASE_DELAY_MS`
    /// - `FROSTPREP_RATE_LIMIT_MS`
    /// - `FROSTPREP_BREAKER_THRESHOLD`
    /// - `FROSTPREP_BREAKER_COOLDOWN_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_parse("FROSTPREP_MAX_RETRIES", defaults.max_retries),
            base_delay: Duration::from_millis(env_parse(
                "FROSTPREP_BASE_DELAY_MS",
                DEFAULT_BASE_DELAY_MS,
            )),
            rate_limit_interval: Duration::from_millis(env_parse(
                "FROSTPREP_RATE_LIMIT_MS",
                DEFAULT_RATE_LIMIT_MS,
            )),
            breaker_threshold: env_parse("FROSTPREP_BREAKER_THRESHOLD", DEFAULT_BREAKER_THRESHOLD),
            breaker_cooldown: Duration::from_millis(env_parse(
                "FROSTPREP_BREAKER_COOLDOWN_MS",
                DEFAULT_BREAKER_COOLDOWN_MS,
            )),
            limits: ValidationLimits::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay, Duration::from_secs(1));
        assert_eq!(config.breaker_threshold, 10);
        assert_eq!(config.breaker_cooldown, Duration::from_secs(30));
        assert_eq!(config.limits.prep_time, 5..=120);
        assert_eq!(config.limits.description_budget, 150);
    }

    #[test]
    fn test_env_parse_ignores_garbage() {
        std::env::set_var("FROSTPREP_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_parse("FROSTPREP_TEST_GARBAGE", 7u32), 7);
        std::env::remove_var("FROSTPREP_TEST_GARBAGE");
    }
}
