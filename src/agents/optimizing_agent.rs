//! Optimizing Agent - The Clarity Crusader.
//!
//! Rewrites every item of the content bundle, one call per item, keeping each
//! item's shape and replacing its content. Blog posts are also stamped with
//! the time they were rewritten.

use std::sync::Arc;

use chrono::Utc;

use crate::llm::LlmProvider;
use crate::prompts::{
    build_blog_optimization_prompt, build_linkedin_optimization_prompt,
    build_tweet_optimization_prompt, StagePrompt,
};

use super::error::AgentResult;
use super::generate_text;
use super::types::{ContentBundle, ContentItem, Optimized, OptimizedContent};

/// Configuration for the Optimizing Agent.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens per rewritten item.
    pub max_tokens: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 3000,
        }
    }
}

impl OptimizerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the temperature (clamped to 0.0-2.0).
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }
}

/// Editorial stage.
pub struct OptimizingAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: OptimizerConfig,
}

impl std::fmt::Debug for OptimizingAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizingAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OptimizingAgent {
    /// Creates a new Optimizing Agent with the given LLM client and configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: OptimizerConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new Optimizing Agent with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, OptimizerConfig::default())
    }

    /// Rewrites every item in `bundle`.
    ///
    /// Empty input collections give empty output collections. The first
    /// failed call aborts the whole pass.
    pub async fn optimize(&self, bundle: ContentBundle<'_>) -> AgentResult<OptimizedContent> {
        tracing::info!(
            blog_posts = bundle.blog_posts.len(),
            tweets = bundle.tweets.len(),
            linkedin_posts = bundle.linkedin_posts.len(),
            "Starting content optimization"
        );

        let blog_posts = self
            .optimize_items(bundle.blog_posts, build_blog_optimization_prompt, true)
            .await?;
        let tweets = self
            .optimize_items(bundle.tweets, build_tweet_optimization_prompt, false)
            .await?;
        let linkedin_posts = self
            .optimize_items(bundle.linkedin_posts, build_linkedin_optimization_prompt, false)
            .await?;

        let optimized = OptimizedContent {
            blog_posts,
            tweets,
            linkedin_posts,
        };
        tracing::info!(items = optimized.total_items(), "Content optimization completed");
        Ok(optimized)
    }

    async fn optimize_items<T>(
        &self,
        items: &[T],
        build_prompt: fn(&T) -> StagePrompt,
        stamp: bool,
    ) -> AgentResult<Vec<Optimized<T>>>
    where
        T: ContentItem + Send + Sync,
    {
        let mut optimized = Vec::with_capacity(items.len());
        for item in items {
            let rewritten = generate_text(
                self.llm_client.as_ref(),
                build_prompt(item),
                self.config.temperature,
                self.config.max_tokens,
            )
            .await?;

            let content = if rewritten.is_empty() {
                tracing::warn!(kind = T::KIND, id = item.id(), "Empty rewrite, keeping original");
                item.content().to_string()
            } else {
                rewritten
            };

            let optimized_at = stamp.then(Utc::now);
            optimized.push(Optimized::completed(item.clone(), content, optimized_at));
        }
        Ok(optimized)
    }
}
