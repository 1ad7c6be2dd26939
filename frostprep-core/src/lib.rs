pub mod audit;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod llm;
pub mod prompts;
pub mod resilience;
pub mod types;
pub mod validate;

pub use audit::{AuditOrchestrator, FieldKind, FieldValue, RecipeField};
pub use config::{CoreConfig, ValidationLimits};
pub use error::{AuditError, GenerationError};
pub use extract::{extract_json, extract_object, ExtractError};
pub use generator::{clean_title, RecipeGenerator};
pub use llm::{
    create_cached_provider_from_env, create_provider_from_env, CachingProvider, CompletionRequest,
    FakeProvider, LlmError, LlmProvider, OpenAiProvider,
};
pub use resilience::{BreakerState, CircuitBreaker, InvokeError, RateLimiter, ResilientInvoker};
pub use types::{AuditResult, GenerationRequest, Ingredient, Recipe, ValidationIssue};
pub use validate::{contains_html_markup, validate};
