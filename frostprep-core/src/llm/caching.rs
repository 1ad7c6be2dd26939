//! Disk cache for completion replies.
//!
//! Generation and repair prompts are deterministic functions of the recipe
//! being worked on, so replaying a batch re-asks many identical questions.
//! The cache stores each reply under a hash of the full request, keyed by
//! provider and model, and serves it back without touching the network.

use super::{CompletionRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

/// Wraps a provider and memoizes its replies on disk.
#[derive(Debug)]
pub struct CachingProvider {
    inner: Box<dyn LlmProvider>,
    cache_dir: PathBuf,
}

/// One cache file: the reply plus enough metadata to audit it by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    metadata: CacheMetadata,
    response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub provider: String,
    pub model: String,
    pub prompt_hash: String,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub cached_responses: usize,
}

impl CachingProvider {
    pub fn new(inner: Box<dyn LlmProvider>, cache_dir: PathBuf) -> Self {
        Self { inner, cache_dir }
    }

    /// Hash of system and user instructions. The NUL separator keeps
    /// `("ab", "c")` and `("a", "bc")` from colliding.
    fn request_hash(request: &CompletionRequest) -> String {
        let mut hasher = Sha256::new();
        hasher.update(request.system.as_bytes());
        hasher.update(b"\0");
        hasher.update(request.user.as_bytes());
        // 16 bytes keeps filenames short; collisions are not a concern at
        // this cache's scale.
        hex::encode(&hasher.finalize()[..16])
    }

    /// Entries live under `<cache_dir>/<provider>/<model>/`, with path
    /// separators in model names made filesystem-safe.
    fn model_dir(&self) -> PathBuf {
        self.cache_dir
            .join(self.inner.provider_name())
            .join(self.inner.model_name().replace(['/', ':'], "_"))
    }

    fn entry_path(&self, hash: &str) -> PathBuf {
        self.model_dir().join(format!("{hash}.json"))
    }

    fn load(&self, hash: &str) -> Option<String> {
        let content = fs::read_to_string(self.entry_path(hash)).ok()?;
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        tracing::debug!(
            provider = self.inner.provider_name(),
            model = self.inner.model_name(),
            prompt_hash = hash,
            "LLM cache hit"
        );
        Some(entry.response)
    }

    fn store(&self, hash: &str, response: &str) -> Result<(), LlmError> {
        let dir = self.model_dir();
        fs::create_dir_all(&dir).map_err(|e| LlmError::Cache(e.to_string()))?;

        let entry = CacheEntry {
            metadata: CacheMetadata {
                provider: self.inner.provider_name().to_string(),
                model: self.inner.model_name().to_string(),
                prompt_hash: hash.to_string(),
                cached_at: Utc::now(),
            },
            response: response.to_string(),
        };

        let content =
            serde_json::to_string_pretty(&entry).map_err(|e| LlmError::Cache(e.to_string()))?;
        fs::write(self.entry_path(hash), content).map_err(|e| LlmError::Cache(e.to_string()))?;

        tracing::debug!(
            provider = self.inner.provider_name(),
            model = self.inner.model_name(),
            prompt_hash = hash,
            "LLM response cached"
        );
        Ok(())
    }

    /// Count of cached replies for this provider/model pair.
    pub fn cache_stats(&self) -> CacheStats {
        let cached_responses = fs::read_dir(self.model_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                    .count()
            })
            .unwrap_or(0);
        CacheStats { cached_responses }
    }
}

#[async_trait]
impl LlmProvider for CachingProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let hash = Self::request_hash(request);

        if let Some(response) = self.load(&hash) {
            return Ok(response);
        }

        tracing::debug!(
            provider = self.inner.provider_name(),
            model = self.inner.model_name(),
            prompt_hash = %hash,
            "LLM cache miss, calling provider"
        );
        let response = self.inner.complete(request).await?;

        // A full disk or unwritable directory must not fail the request.
        if let Err(e) = self.store(&hash, &response) {
            tracing::warn!(error = %e, "failed to cache LLM response");
        }

        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
