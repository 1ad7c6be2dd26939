//! LLM provider abstraction for recipe generation and repair.
//!
//! This module provides a trait-based abstraction over chat-completion
//! providers with support for disk caching and deterministic testing. The
//! provider is an untrusted black box: it takes instructions in, returns
//! free-form text out, and everything downstream treats that text
//! defensively.

mod caching;
mod fake;
mod openai;

pub use caching::{CacheStats, CachingProvider};
pub use fake::FakeProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl From<crate::extract::ExtractError> for LlmError {
    fn from(err: crate::extract::ExtractError) -> Self {
        LlmError::Parse(err.to_string())
    }
}

/// One chat-completion request: system and user instructions plus
/// sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.7,
            max_tokens: 4_000,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for chat-completion providers.
///
/// Implementations should be stateless and thread-safe; resilience
/// (retry, rate limiting, circuit breaking) is layered on top by the
/// invoker, not inside providers.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a completion request and return the model's raw text reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Provider name (e.g., "openai", "fake").
    fn provider_name(&self) -> &'static str;

    /// Model name (e.g., "gpt-4o-mini").
    fn model_name(&self) -> &str;
}

/// Create a provider from environment variables:
/// - `FROSTPREP_PROVIDER`: "openai" | "fake" (default "fake")
/// - `OPENAI_API_KEY`: API key for the openai provider
/// - `FROSTPREP_MODEL`: model name (default "gpt-4o-mini")
/// - `FROSTPREP_BASE_URL`: API base URL (default "https://api.openai.com/v1")
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let provider = std::env::var("FROSTPREP_PROVIDER").unwrap_or_else(|_| "fake".to_string());

    match provider.as_str() {
        "fake" => Ok(Box::new(FakeProvider::default())),
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| LlmError::NotConfigured("OPENAI_API_KEY not set".to_string()))?;
            let model =
                std::env::var("FROSTPREP_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
            let base_url = std::env::var("FROSTPREP_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
            Ok(Box::new(OpenAiProvider::new(api_key, model, base_url)))
        }
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}

/// Create a provider with disk caching enabled.
///
/// Cache directory comes from `FROSTPREP_CACHE_DIR` or defaults to
/// `~/.frostprep/llm-cache`.
pub fn create_cached_provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let inner = create_provider_from_env()?;

    let cache_dir = std::env::var("FROSTPREP_CACHE_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".frostprep").join("llm-cache"))
                .unwrap_or_else(|| std::path::PathBuf::from("data/llm-cache"))
        });

    Ok(Box::new(CachingProvider::new(inner, cache_dir)))
}
