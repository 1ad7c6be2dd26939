//! Top-level error types for generation and audit.

use thiserror::Error;

use crate::extract::ExtractError;
use crate::resilience::InvokeError;

/// Error type for recipe generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("generated recipe could not be deserialized: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("generated recipe is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// Error type for the audit/repair pass.
///
/// Per-field repair failures are not errors; they are recorded in the
/// audit notes and the field is left unset. Only infrastructure problems
/// surface here.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to serialize repair context: {0}")]
    Context(#[from] serde_json::Error),
}
