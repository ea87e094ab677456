//! LinkedIn Agent - professional-network posts.
//!
//! Produces exactly [`LINKEDIN_POST_COUNT`] posts: one educational post per
//! blog post (the first [`EDUCATIONAL_POST_COUNT`], padded if fewer exist),
//! followed by the three fixed entertaining requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::llm::LlmProvider;
use crate::prompts::{
    build_educational_linkedin_prompt, StagePrompt, ENTERTAINING_LINKEDIN_PROMPTS, LINKEDIN_SYSTEM,
};

use super::cardinality::fix_cardinality;
use super::error::AgentResult;
use super::types::{
    BlogPost, LinkedInPost, LinkedInPostType, EDUCATIONAL_POST_COUNT, LINKEDIN_POST_COUNT,
};
use super::generate_text;

/// Text of the padding educational post.
pub const FILLER_EDUCATIONAL_POST: &str = "🎯 One lesson every team adopting AI learns quickly: the tools matter less than the questions you ask them.\n\nStart with a real problem, measure what changes, and share what you learn.\n\nWhat is the most useful question your team has asked an AI this month?\n\n#AI #Innovation #FutureOfWork #TechLeadership #DigitalTransformation";

/// Stand-in for an entertaining post the model left empty.
fn filler_entertaining_post(kind: LinkedInPostType) -> &'static str {
    match kind {
        LinkedInPostType::Humorous => "😄 My AI assistant and I have reached an understanding: it writes the first draft, I write the apology for the first draft.\n\nWhat is the funniest thing an AI tool has done for your team?\n\n#AI #WorkHumor #Innovation",
        LinkedInPostType::Entertaining => "🎬 Quick poll: if your AI tools formed a band, who would be the lead singer?\n\nDrop your line-up in the comments.\n\n#AI #TechCulture #Innovation",
        LinkedInPostType::Educational => FILLER_EDUCATIONAL_POST,
    }
}

/// Configuration for the LinkedIn Agent.
#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens per post.
    pub max_tokens: u32,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 1200,
        }
    }
}

impl LinkedInConfig {
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

/// LinkedIn generation sub-task of the social stage.
pub struct LinkedInAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: LinkedInConfig,
}

impl std::fmt::Debug for LinkedInAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedInAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LinkedInAgent {
    /// Creates a new LinkedIn Agent with the given LLM client and configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: LinkedInConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new LinkedIn Agent with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, LinkedInConfig::default())
    }

    /// Generates exactly [`LINKEDIN_POST_COUNT`] posts.
    ///
    /// An empty reply is replaced by the filler text of its post type.
    pub async fn generate_posts(&self, blogs: &[BlogPost]) -> AgentResult<Vec<LinkedInPost>> {
        tracing::info!(blogs = blogs.len(), "Starting LinkedIn post generation");

        let mut educational = Vec::with_capacity(EDUCATIONAL_POST_COUNT);
        for (index, blog) in blogs.iter().take(EDUCATIONAL_POST_COUNT).enumerate() {
            let content = self
                .complete(build_educational_linkedin_prompt(blog))
                .await?
                .unwrap_or_else(|| FILLER_EDUCATIONAL_POST.to_string());
            educational.push(educational_post(index, content, Some(blog.id.clone())));
        }
        let mut posts = fix_cardinality(educational, EDUCATIONAL_POST_COUNT, |index| {
            educational_post(index, FILLER_EDUCATIONAL_POST.to_string(), None)
        });

        for (index, (kind, request)) in ENTERTAINING_LINKEDIN_PROMPTS.iter().enumerate() {
            let content = self
                .complete(StagePrompt::new(LINKEDIN_SYSTEM, *request))
                .await?
                .unwrap_or_else(|| filler_entertaining_post(*kind).to_string());
            posts.push(entertaining_post(index, *kind, content));
        }

        debug_assert_eq!(posts.len(), LINKEDIN_POST_COUNT);
        tracing::info!(total = posts.len(), "Generated LinkedIn posts");
        Ok(posts)
    }

    /// `None` when the reply is empty.
    async fn complete(&self, prompt: StagePrompt) -> AgentResult<Option<String>> {
        let text = generate_text(
            self.llm_client.as_ref(),
            prompt,
            self.config.temperature,
            self.config.max_tokens,
        )
        .await?;
        if text.is_empty() {
            tracing::warn!("Empty LinkedIn reply, using filler post");
            return Ok(None);
        }
        Ok(Some(text))
    }
}

fn educational_post(index: usize, content: String, source_blog_id: Option<String>) -> LinkedInPost {
    LinkedInPost {
        id: format!("linkedin_edu_{}", index + 1),
        content,
        kind: LinkedInPostType::Educational,
        source_blog_id,
        created_at: Utc::now(),
        metadata: BTreeMap::from([
            ("estimated_read_time".to_string(), "1 minute".to_string()),
            (
                "target_audience".to_string(),
                "Tech professionals and leaders".to_string(),
            ),
        ]),
    }
}

fn entertaining_post(index: usize, kind: LinkedInPostType, content: String) -> LinkedInPost {
    LinkedInPost {
        id: format!("linkedin_{}_{}", kind, index + 1),
        content,
        kind,
        source_blog_id: None,
        created_at: Utc::now(),
        metadata: BTreeMap::from([
            (
                "estimated_reach".to_string(),
                "High - entertaining content".to_string(),
            ),
            (
                "engagement_type".to_string(),
                "Comments and shares".to_string(),
            ),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::mock::MockLlmProvider;
    use crate::agents::types::BlogMetadata;
    use crate::agents::AgentError;

    fn blogs(n: usize) -> Vec<BlogPost> {
        (1..=n)
            .map(|i| BlogPost {
                id: format!("blog_{}", i),
                topic: format!("Topic {}", i),
                title: format!("Title {}", i),
                content: format!("Body {}", i),
                word_count: 2,
                created_at: Utc::now(),
                metadata: BlogMetadata {
                    audience: "devs".to_string(),
                    reading_time: "0 minutes".to_string(),
                    key_concepts: vec![],
                },
            })
            .collect()
    }

    #[tokio::test]
    async fn test_six_posts_with_expected_layout() {
        let mock = Arc::new(MockLlmProvider::always("A thoughtful post. #AI"));
        let agent = LinkedInAgent::with_defaults(mock.clone());

        let posts = agent.generate_posts(&blogs(3)).await.unwrap();

        assert_eq!(posts.len(), LINKEDIN_POST_COUNT);
        assert_eq!(mock.call_count(), 6);

        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "linkedin_edu_1",
                "linkedin_edu_2",
                "linkedin_edu_3",
                "linkedin_humorous_1",
                "linkedin_humorous_2",
                "linkedin_entertaining_3"
            ]
        );
        let sources: Vec<Option<&str>> = posts[..3]
            .iter()
            .map(|p| p.source_blog_id.as_deref())
            .collect();
        assert_eq!(sources, vec![Some("blog_1"), Some("blog_2"), Some("blog_3")]);
        assert_eq!(posts[0].metadata["target_audience"], "Tech professionals and leaders");
        assert_eq!(posts[5].metadata["engagement_type"], "Comments and shares");
        assert!(posts[3..].iter().all(|p| p.source_blog_id.is_none()));
    }

    #[tokio::test]
    async fn test_pads_educational_posts_when_blogs_missing() {
        let mock = Arc::new(MockLlmProvider::always("post"));
        let agent = LinkedInAgent::with_defaults(mock.clone());

        let posts = agent.generate_posts(&blogs(1)).await.unwrap();

        assert_eq!(posts.len(), LINKEDIN_POST_COUNT);
        assert_eq!(mock.call_count(), 4);
        assert_eq!(posts[1].id, "linkedin_edu_2");
        assert_eq!(posts[1].content, FILLER_EDUCATIONAL_POST);
        assert!(posts[1].source_blog_id.is_none());
    }

    #[tokio::test]
    async fn test_extra_blogs_are_ignored() {
        let mock = Arc::new(MockLlmProvider::always("post"));
        let agent = LinkedInAgent::with_defaults(mock.clone());

        let posts = agent.generate_posts(&blogs(5)).await.unwrap();
        assert_eq!(posts.len(), LINKEDIN_POST_COUNT);
        assert_eq!(mock.call_count(), 6);
    }

    #[tokio::test]
    async fn test_empty_replies_fall_back_to_filler_posts() {
        let mock = Arc::new(MockLlmProvider::always("   "));
        let agent = LinkedInAgent::with_defaults(mock.clone());

        let posts = agent.generate_posts(&blogs(3)).await.unwrap();

        assert_eq!(posts.len(), LINKEDIN_POST_COUNT);
        assert_eq!(mock.call_count(), 6);
        assert_eq!(posts[0].content, FILLER_EDUCATIONAL_POST);
        assert_eq!(posts[0].source_blog_id.as_deref(), Some("blog_1"));
        assert_eq!(
            posts[3].content,
            filler_entertaining_post(LinkedInPostType::Humorous)
        );
        assert_eq!(
            posts[5].content,
            filler_entertaining_post(LinkedInPostType::Entertaining)
        );
        assert!(posts.iter().all(|p| !p.content.trim().is_empty()));
    }

    #[tokio::test]
    async fn test_failure_in_entertaining_post_propagates() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![
            Ok("edu 1"),
            Ok("edu 2"),
            Ok("edu 3"),
            Err("server overloaded"),
        ]));
        let agent = LinkedInAgent::with_defaults(mock);
        let err = agent.generate_posts(&blogs(3)).await.expect_err("should fail");
        assert!(matches!(err, AgentError::LlmError(_)));
    }
}
