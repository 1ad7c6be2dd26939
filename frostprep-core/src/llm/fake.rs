//! Fake LLM provider for testing.
//!
//! Returns deterministic responses based on prompt matching, so tests run
//! without network access. It can also fail a configured number of times
//! before succeeding, which the resilience tests lean on.

use super::{CompletionRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

/// A fake provider matched by prompt substring.
///
/// Responses are matched by checking if the user prompt contains a
/// registered substring (case-insensitive). If no match is found, the
/// default response or an error is returned.
#[derive(Debug)]
pub struct FakeProvider {
    /// Map of prompt substring -> response.
    responses: RwLock<HashMap<String, String>>,
    /// Default response if no pattern matches.
    default_response: Option<String>,
    /// Fail this many calls before behaving normally.
    failures_remaining: AtomicU32,
    /// Total completed calls (including simulated failures).
    calls: AtomicU32,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: Some("{}".to_string()),
            failures_remaining: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        }
    }
}

impl FakeProvider {
    /// Create a provider with no registered responses.
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: None,
            failures_remaining: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        }
    }

    /// Create a provider returning `response` for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let mut provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// Register a response for prompts containing a substring.
    pub fn add_response(&mut self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap()
            .insert(prompt_contains.to_string(), response.to_string());
    }

    /// Set the default response used when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Fail the next `count` calls with a transport error.
    pub fn failing(mut self, count: u32) -> Self {
        self.failures_remaining = AtomicU32::new(count);
        self
    }

    /// Number of completed calls, including simulated failures.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(LlmError::RequestFailed(
                "FakeProvider: simulated transport failure".to_string(),
            ));
        }

        let responses = self.responses.read().unwrap();
        let prompt_lower = request.user.to_lowercase();
        for (pattern, response) in responses.iter() {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: no response configured for prompt (first 100 chars): {}",
                request.user.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest::new("system", user)
    }

    #[tokio::test]
    async fn test_substring_matching() {
        let provider = FakeProvider::with_response("stew", r#"{"title": "Beef Stew"}"#);
        let result = provider.complete(&request("Generate a stew recipe")).await.unwrap();
        assert!(result.contains("Beef Stew"));
    }

    #[tokio::test]
    async fn test_case_insensitive_matching() {
        let provider = FakeProvider::with_response("STEW", "matched");
        let result = provider.complete(&request("a stew please")).await.unwrap();
        assert_eq!(result, "matched");
    }

    #[tokio::test]
    async fn test_no_match_errors_without_default() {
        let provider = FakeProvider::new();
        assert!(provider.complete(&request("anything")).await.is_err());
    }

    #[tokio::test]
    async fn test_default_response() {
        let provider = FakeProvider::new().with_default_response("fallback");
        let result = provider.complete(&request("anything")).await.unwrap();
        assert_eq!(result, "fallback");
    }

    #[tokio::test]
    async fn test_failing_then_succeeding() {
        let provider = FakeProvider::new()
            .with_default_response("ok")
            .failing(2);

        assert!(provider.complete(&request("x")).await.is_err());
        assert!(provider.complete(&request("x")).await.is_err());
        assert_eq!(provider.complete(&request("x")).await.unwrap(), "ok");
        assert_eq!(provider.call_count(), 3);
    }
}
