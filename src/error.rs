//! Error types for agentic-loop collaborators.
//!
//! Defines error types for the external collaborators the pipeline talks to:
//! - LLM API interactions (the text-generation service)
//! - Spreadsheet row retrieval
//! - Result delivery (email transport)
//!
//! Stage-level errors live in [`crate::agents::AgentError`], configuration
//! errors in [`crate::pipeline::ConfigError`].

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key for role '{0}': set LITELLM_API_KEY or the role-specific override")]
    MissingApiKey(String),

    #[error("Missing API base URL: LITELLM_API_BASE is empty")]
    MissingApiBase,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("LLM call timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

/// Errors that can occur while fetching topic rows.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Spreadsheet source not configured: {0}")]
    NotConfigured(String),

    #[error("Spreadsheet request failed: {0}")]
    RequestFailed(String),

    #[error("Spreadsheet API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Failed to parse spreadsheet response: {0}")]
    ParseError(String),

    #[error("Spreadsheet contains no data rows")]
    Empty,
}

/// Errors that can occur while delivering a run report.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    MessageBuild(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Failed to render report: {0}")]
    Render(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
