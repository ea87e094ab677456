//! Twitter Agent - short-form posts.
//!
//! Produces exactly [`TWEET_COUNT`] tweets: up to [`TWEETS_PER_BLOG`] per blog
//! post, then up to [`WEB_TWEET_COUNT`] from an open-ended trend prompt, then
//! a fixed filler tweet until the count is reached.

use std::sync::Arc;

use chrono::Utc;

use crate::llm::LlmProvider;
use crate::prompts::{
    build_blog_tweet_prompt, build_web_tweet_prompt, StagePrompt, WEB_TWEET_CATEGORIES,
};

use super::cardinality::{fix_cardinality, split_items};
use super::error::AgentResult;
use super::generate_text;
use super::types::{
    BlogPost, Tweet, TweetType, BLOG_POST_COUNT, TWEETS_PER_BLOG, TWEET_COUNT, WEB_TWEET_COUNT,
};

/// Text of the padding tweet.
pub const FILLER_TWEET: &str =
    "🚀 AI is transforming how we work and create. What's your favorite AI tool? #AI #Innovation";

/// Configuration for the Twitter Agent.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens per call.
    pub max_tokens: u32,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            max_tokens: 800,
        }
    }
}

impl TwitterConfig {
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

/// Tweet generation sub-task of the social stage.
pub struct TwitterAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: TwitterConfig,
}

impl std::fmt::Debug for TwitterAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TwitterAgent {
    /// Creates a new Twitter Agent with the given LLM client and configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: TwitterConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new Twitter Agent with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, TwitterConfig::default())
    }

    /// Generates exactly [`TWEET_COUNT`] tweets.
    ///
    /// One call per blog post (at most [`BLOG_POST_COUNT`]) plus one trend
    /// call, all sequential.
    pub async fn generate_tweets(&self, blogs: &[BlogPost]) -> AgentResult<Vec<Tweet>> {
        tracing::info!(blogs = blogs.len(), "Starting tweet generation");
        let mut tweets = Vec::with_capacity(TWEET_COUNT);

        for (blog_index, blog) in blogs.iter().take(BLOG_POST_COUNT).enumerate() {
            let reply = self.complete(build_blog_tweet_prompt(blog)).await?;
            let derived = split_items(&reply)
                .into_iter()
                .take(TWEETS_PER_BLOG)
                .enumerate()
                .map(|(j, content)| Tweet {
                    id: format!("tweet_blog_{}_{}", blog_index + 1, j + 1),
                    content,
                    kind: TweetType::BlogBased,
                    category: if j == 0 { "educational" } else { "engaging" }.to_string(),
                    source_blog_id: Some(blog.id.clone()),
                    created_at: Utc::now(),
                });
            tweets.extend(derived);
        }

        let reply = self.complete(build_web_tweet_prompt()).await?;
        let web = split_items(&reply)
            .into_iter()
            .take(WEB_TWEET_COUNT)
            .zip(WEB_TWEET_CATEGORIES)
            .enumerate()
            .map(|(j, (content, category))| Tweet {
                id: format!("tweet_web_{}", j + 1),
                content,
                kind: TweetType::WebSearch,
                category: category.to_string(),
                source_blog_id: None,
                created_at: Utc::now(),
            });
        tweets.extend(web);

        let produced = tweets.len();
        let tweets = fix_cardinality(tweets, TWEET_COUNT, filler_tweet);
        tracing::info!(produced, total = tweets.len(), "Generated tweets");
        Ok(tweets)
    }

    async fn complete(&self, prompt: StagePrompt) -> AgentResult<String> {
        generate_text(
            self.llm_client.as_ref(),
            prompt,
            self.config.temperature,
            self.config.max_tokens,
        )
        .await
    }
}

/// Padding tweet for zero-based slot `index`.
fn filler_tweet(index: usize) -> Tweet {
    Tweet {
        id: format!("tweet_extra_{}", index + 1),
        content: FILLER_TWEET.to_string(),
        kind: TweetType::Filler,
        category: "engaging".to_string(),
        source_blog_id: None,
        created_at: Utc::now(),
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
                content: "Body".to_string(),
                word_count: 1,
                created_at: Utc::now(),
                metadata: BlogMetadata {
                    audience: "devs".to_string(),
                    reading_time: "0 minutes".to_string(),
                    key_concepts: vec![],
                },
            })
            .collect()
    }

    const WEB_REPLY: &str = "1. Q?\n2. Go build\n3. Joke one\n4. Joke two\n5. Story\n6. Trend\n7. Extra";

    #[tokio::test]
    async fn test_full_output_layout() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![
            Ok("Tweet 1: Learn A\nTweet 2: Ask A?"),
            Ok("Learn B\nAsk B?\nSurplus B"),
            Ok("Learn C\nAsk C?"),
            Ok(WEB_REPLY),
        ]));
        let agent = TwitterAgent::with_defaults(mock.clone());

        let tweets = agent.generate_tweets(&blogs(3)).await.unwrap();

        assert_eq!(tweets.len(), TWEET_COUNT);
        assert_eq!(mock.call_count(), 4);

        assert_eq!(tweets[0].id, "tweet_blog_1_1");
        assert_eq!(tweets[0].content, "Learn A");
        assert_eq!(tweets[0].category, "educational");
        assert_eq!(tweets[1].category, "engaging");
        assert_eq!(tweets[3].source_blog_id.as_deref(), Some("blog_2"));
        assert!(tweets[..6].iter().all(|t| t.kind == TweetType::BlogBased));

        let categories: Vec<&str> = tweets[6..].iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, WEB_TWEET_CATEGORIES.to_vec());
        assert_eq!(tweets[6].id, "tweet_web_1");
        assert_eq!(tweets[11].content, "Trend");
        assert!(tweets[6..].iter().all(|t| t.source_blog_id.is_none()));
    }

    #[tokio::test]
    async fn test_pads_with_filler_when_replies_are_short() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![
            Ok("Only one"),
            Ok(""),
            Ok("Two\nTweets"),
            Ok("Web one"),
        ]));
        let agent = TwitterAgent::with_defaults(mock);

        let tweets = agent.generate_tweets(&blogs(3)).await.unwrap();

        assert_eq!(tweets.len(), TWEET_COUNT);
        let blog_based = tweets.iter().filter(|t| t.kind == TweetType::BlogBased).count();
        assert_eq!(blog_based, 3);
        assert_eq!(tweets[3].id, "tweet_web_1");

        let fillers: Vec<&Tweet> = tweets.iter().filter(|t| t.kind == TweetType::Filler).collect();
        assert_eq!(fillers.len(), 8);
        assert_eq!(fillers[0].id, "tweet_extra_5");
        assert_eq!(fillers[0].content, FILLER_TWEET);
        assert_eq!(fillers[7].id, "tweet_extra_12");
    }

    #[tokio::test]
    async fn test_single_blog_still_yields_twelve() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![Ok("A\nB"), Ok(WEB_REPLY)]));
        let agent = TwitterAgent::with_defaults(mock.clone());

        let tweets = agent.generate_tweets(&blogs(1)).await.unwrap();

        assert_eq!(tweets.len(), TWEET_COUNT);
        assert_eq!(mock.call_count(), 2);
        assert_eq!(
            tweets.iter().filter(|t| t.kind == TweetType::Filler).count(),
            4
        );
    }

    #[tokio::test]
    async fn test_extra_blogs_do_not_crowd_out_web_tweets() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![
            Ok("A1\nA2"),
            Ok("B1\nB2"),
            Ok("C1\nC2"),
            Ok(WEB_REPLY),
        ]));
        let agent = TwitterAgent::with_defaults(mock.clone());

        let tweets = agent.generate_tweets(&blogs(5)).await.unwrap();

        assert_eq!(mock.call_count(), 4);
        assert_eq!(tweets.len(), TWEET_COUNT);
        assert_eq!(
            tweets.iter().filter(|t| t.kind == TweetType::WebSearch).count(),
            WEB_TWEET_COUNT
        );
        assert!(tweets
            .iter()
            .all(|t| t.source_blog_id.as_deref() != Some("blog_4")));
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![Ok("A\nB"), Err("boom")]));
        let agent = TwitterAgent::with_defaults(mock);
        let err = agent.generate_tweets(&blogs(3)).await.expect_err("should fail");
        assert!(matches!(err, AgentError::LlmError(_)));
    }
}
