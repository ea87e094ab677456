//! LLM integration for agentic-loop.
//!
//! The pipeline treats text generation as an opaque service behind the
//! [`LlmProvider`] trait. Concrete pieces:
//!
//! - [`litellm`]: OpenAI-compatible HTTP client ([`LiteLlmClient`])
//! - [`throttle`]: token-bucket pacing and per-call timeouts ([`ThrottledProvider`])
//! - [`roles`]: one throttled client per pipeline role, each with its own key
//!
//! ```ignore
//! use agentic_loop::llm::{RoleClients, LlmRole};
//! use agentic_loop::pipeline::PipelineConfig;
//!
//! let config = PipelineConfig::from_env()?;
//! let clients = RoleClients::from_config(&config)?;
//! let research = clients.get(LlmRole::Research);
//! ```

pub mod litellm;
pub mod roles;
pub mod throttle;

pub use litellm::{
    Choice, GenerationRequest, GenerationResponse, LiteLlmClient, LlmProvider, Message, Usage,
    DEFAULT_API_BASE, DEFAULT_MODEL,
};
pub use roles::{LlmRole, RoleClients};
pub use throttle::{RateLimitPolicy, RateLimiter, ThrottledProvider};
