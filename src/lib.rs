//! agentic-loop: multi-stage content automation driven by LLM agents.
//!
//! A run reads topic rows from a spreadsheet, researches them, writes blog
//! posts, derives tweets and LinkedIn posts, polishes everything and emails
//! the result. An HTTP service starts runs in the background.

pub mod agents;
pub mod cli;
pub mod collectors;
pub mod error;
pub mod export;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod server;

// Re-export commonly used error types
pub use error::{DeliveryError, LlmError, SourceError};
