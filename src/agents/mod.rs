//! Content stages of the pipeline.
//!
//! Each agent wraps one role's [`LlmProvider`] and turns upstream values into
//! a typed collection. Agents never touch the run record or any network
//! service other than the text-generation call, and they do not retry:
//! a failed call propagates as an [`AgentError`].

pub mod blog_writer;
pub mod cardinality;
pub mod error;
pub mod linkedin_agent;
pub mod optimizing_agent;
pub mod research_agent;
pub mod twitter_agent;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use blog_writer::{BlogWriterAgent, BlogWriterConfig};
pub use cardinality::{fix_cardinality, split_items};
pub use error::{AgentError, AgentResult};
pub use linkedin_agent::{LinkedInAgent, LinkedInConfig};
pub use optimizing_agent::{OptimizerConfig, OptimizingAgent};
pub use research_agent::{ResearchAgent, ResearchConfig};
pub use twitter_agent::{TwitterAgent, TwitterConfig};
pub use types::{
    BlogMetadata, BlogPost, ContentBundle, ContentItem, LinkedInPost, LinkedInPostType,
    OptimizationStatus, Optimized, OptimizedContent, ResearchReport, Row, Tweet, TweetType,
    BLOG_POST_COUNT, EDUCATIONAL_POST_COUNT, LINKEDIN_POST_COUNT, TWEETS_PER_BLOG, TWEET_COUNT,
    WEB_TWEET_COUNT,
};

use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::prompts::StagePrompt;

/// Sends one prompt and returns the trimmed reply text, which may be empty.
pub(crate) async fn generate_text(
    llm_client: &dyn LlmProvider,
    prompt: StagePrompt,
    temperature: f64,
    max_tokens: u32,
) -> AgentResult<String> {
    let request = GenerationRequest::new(
        "",
        vec![Message::system(prompt.system), Message::user(prompt.user)],
    )
    .with_temperature(temperature)
    .with_max_tokens(max_tokens);

    let response = llm_client.generate(request).await?;

    let content = response
        .first_content()
        .ok_or_else(|| AgentError::ResponseParseError("Empty LLM response".to_string()))?;

    Ok(content.trim().to_string())
}

/// Rejects an empty reply where a stage needs actual text.
pub(crate) fn require_text(text: String, what: &str) -> AgentResult<String> {
    if text.is_empty() {
        return Err(AgentError::ResponseParseError(format!(
            "LLM returned empty {}",
            what
        )));
    }
    Ok(text)
}
