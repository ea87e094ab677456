//! Error types for the content stages.

use thiserror::Error;

/// Errors that can occur while a stage produces its content.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Error from the text-generation service.
    #[error("LLM error: {0}")]
    LlmError(String),

    /// The service answered, but with nothing usable.
    #[error("Failed to parse LLM response: {0}")]
    ResponseParseError(String),

    /// A stage aborted without returning, e.g. by panicking.
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },
}

impl From<crate::error::LlmError> for AgentError {
    fn from(err: crate::error::LlmError) -> Self {
        AgentError::LlmError(err.to_string())
    }
}

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
