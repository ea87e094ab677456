//! Blog Writer Agent - The Illuminator.
//!
//! Writes exactly [`BLOG_POST_COUNT`] long-form posts, one generation call per
//! post. Topics come from the first usable row topics; missing slots are
//! filled with synthetic `AI Innovation Topic {n}` topics.

use std::sync::Arc;

use chrono::Utc;

use crate::llm::LlmProvider;
use crate::prompts::build_blog_prompt;

use super::cardinality::fix_cardinality;
use super::error::AgentResult;
use super::types::{BlogMetadata, BlogPost, ResearchReport, Row, BLOG_POST_COUNT};
use super::generate_text;

/// Words per minute used for the reading-time estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Body stored when the model answers with nothing.
fn placeholder_body(topic: &str) -> String {
    format!(
        "This article on {} could not be drafted in this run. The research notes attached to the report cover the topic in the meantime.",
        topic
    )
}

/// Configuration for the Blog Writer Agent.
#[derive(Debug, Clone)]
pub struct BlogWriterConfig {
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens for each post.
    pub max_tokens: u32,
    /// Audience recorded in post metadata.
    pub audience: String,
    /// Key concepts recorded in post metadata.
    pub key_concepts: Vec<String>,
}

impl Default for BlogWriterConfig {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 3000,
            audience: "Technical professionals and enthusiasts".to_string(),
            key_concepts: vec![
                "AI".to_string(),
                "Innovation".to_string(),
                "Practical Applications".to_string(),
            ],
        }
    }
}

impl BlogWriterConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the temperature (clamped to 0.0-2.0).
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Sets the maximum tokens per post.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

}

/// Blog writing stage.
pub struct BlogWriterAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: BlogWriterConfig,
}

impl std::fmt::Debug for BlogWriterAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlogWriterAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BlogWriterAgent {
    /// Creates a new Blog Writer Agent with the given LLM client and configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: BlogWriterConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new Blog Writer Agent with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, BlogWriterConfig::default())
    }

    /// Writes exactly [`BLOG_POST_COUNT`] posts, in topic order.
    ///
    /// Posts are generated one after another; the first failed call aborts
    /// the stage. An empty reply keeps its slot with a placeholder body.
    pub async fn write_posts(
        &self,
        research: &ResearchReport,
        rows: &[Row],
    ) -> AgentResult<Vec<BlogPost>> {
        let topics = select_topics(rows);
        let mut posts = Vec::with_capacity(topics.len());

        for (index, topic) in topics.into_iter().enumerate() {
            let content = generate_text(
                self.llm_client.as_ref(),
                build_blog_prompt(&topic, research),
                self.config.temperature,
                self.config.max_tokens,
            )
            .await?;
            let content = if content.is_empty() {
                tracing::warn!(topic = %topic, "Empty blog reply, using placeholder body");
                placeholder_body(&topic)
            } else {
                content
            };

            let post = self.shape_post(index, topic, content);
            tracing::info!(
                blog_id = %post.id,
                words = post.word_count,
                "Generated blog post {} of {}",
                index + 1,
                BLOG_POST_COUNT
            );
            posts.push(post);
        }

        Ok(posts)
    }

    fn shape_post(&self, index: usize, topic: String, content: String) -> BlogPost {
        let word_count = content.split_whitespace().count();
        let title = extract_title(&content)
            .unwrap_or_else(|| format!("Illuminating {}: A Journey to Understanding", topic));

        BlogPost {
            id: format!("blog_{}", index + 1),
            topic,
            title,
            content,
            word_count,
            created_at: Utc::now(),
            metadata: BlogMetadata {
                audience: self.config.audience.clone(),
                reading_time: format!("{} minutes", word_count / WORDS_PER_MINUTE),
                key_concepts: self.config.key_concepts.clone(),
            },
        }
    }
}

/// Picks the first [`BLOG_POST_COUNT`] usable topics, padded with
/// `AI Innovation Topic {n}` where `n` is the 1-based slot.
pub fn select_topics(rows: &[Row]) -> Vec<String> {
    let topics: Vec<String> = rows
        .iter()
        .filter_map(Row::topic)
        .map(str::to_string)
        .collect();
    fix_cardinality(topics, BLOG_POST_COUNT, |slot| {
        format!("AI Innovation Topic {}", slot + 1)
    })
}

/// Returns the first markdown `# ` heading, if any.
fn extract_title(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().trim_matches('*').trim().to_string())
        .filter(|title| !title.is_empty())
}
