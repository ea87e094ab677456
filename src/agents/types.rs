//! Core content types for the pipeline.
//!
//! Every stage consumes borrowed upstream values and returns new ones built
//! from these types; only the orchestrator stores them on the run record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Blog posts produced per run.
pub const BLOG_POST_COUNT: usize = 3;
/// Tweets produced per run.
pub const TWEET_COUNT: usize = 12;
/// Tweets derived from each blog post.
pub const TWEETS_PER_BLOG: usize = 2;
/// Tweets requested from the open-ended trend prompt.
pub const WEB_TWEET_COUNT: usize = 6;
/// LinkedIn posts produced per run.
pub const LINKEDIN_POST_COUNT: usize = 6;
/// Educational LinkedIn posts, one per blog post.
pub const EDUCATIONAL_POST_COUNT: usize = 3;

/// One spreadsheet row: normalised header name to cell value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The row's topic, if present and not blank.
    pub fn topic(&self) -> Option<&str> {
        self.get("topic").map(str::trim).filter(|t| !t.is_empty())
    }

    /// Comma-separated links, trimmed, blanks dropped.
    pub fn links(&self) -> Vec<&str> {
        self.get("links")
            .map(|links| {
                links
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Iterates fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }
}

/// Output of the research stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub timestamp: DateTime<Utc>,
    /// Query sent to the model.
    pub query: String,
    /// Model output, unparsed.
    pub raw_text: String,
    /// Number of rows the query covered.
    pub topics_analyzed: usize,
    pub status: String,
}

/// Reader-facing metadata on a blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogMetadata {
    pub audience: String,
    pub reading_time: String,
    pub key_concepts: Vec<String>,
}

/// A long-form post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub topic: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
    pub metadata: BlogMetadata,
}

/// Where a tweet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweetType {
    BlogBased,
    WebSearch,
    Filler,
}

impl std::fmt::Display for TweetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TweetType::BlogBased => write!(f, "blog_based"),
            TweetType::WebSearch => write!(f, "web_search"),
            TweetType::Filler => write!(f, "filler"),
        }
    }
}

/// A short-form post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: TweetType,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_blog_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Flavour of a LinkedIn post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedInPostType {
    Educational,
    Humorous,
    Entertaining,
}

impl LinkedInPostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkedInPostType::Educational => "educational",
            LinkedInPostType::Humorous => "humorous",
            LinkedInPostType::Entertaining => "entertaining",
        }
    }
}

impl std::fmt::Display for LinkedInPostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A professional-network post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedInPost {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: LinkedInPostType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_blog_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Common surface of every content item the editorial pass rewrites.
pub trait ContentItem: Clone {
    /// Item kind, used in prompts and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn content(&self) -> &str;

    /// Returns the item with its content replaced.
    fn with_content(self, content: String) -> Self;
}

impl ContentItem for BlogPost {
    const KIND: &'static str = "blog_post";

    fn id(&self) -> &str {
        &self.id
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn with_content(mut self, content: String) -> Self {
        self.word_count = content.split_whitespace().count();
        self.content = content;
        self
    }
}

impl ContentItem for Tweet {
    const KIND: &'static str = "tweet";

    fn id(&self) -> &str {
        &self.id
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }
}

impl ContentItem for LinkedInPost {
    const KIND: &'static str = "linkedin_post";

    fn id(&self) -> &str {
        &self.id
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }
}

/// Marker added by the editorial pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStatus {
    Completed,
}

/// An item after the editorial pass: same shape, new content, plus a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimized<T> {
    #[serde(flatten)]
    pub item: T,
    pub optimization_status: OptimizationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_at: Option<DateTime<Utc>>,
}

impl<T: ContentItem> Optimized<T> {
    /// Wraps `item` with `content` swapped in.
    pub fn completed(item: T, content: String, optimized_at: Option<DateTime<Utc>>) -> Self {
        Self {
            item: item.with_content(content),
            optimization_status: OptimizationStatus::Completed,
            optimized_at,
        }
    }
}

/// All three optimized collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizedContent {
    pub blog_posts: Vec<Optimized<BlogPost>>,
    pub tweets: Vec<Optimized<Tweet>>,
    pub linkedin_posts: Vec<Optimized<LinkedInPost>>,
}

impl OptimizedContent {
    pub fn total_items(&self) -> usize {
        self.blog_posts.len() + self.tweets.len() + self.linkedin_posts.len()
    }
}

/// Read-only view of the content the editorial pass works on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentBundle<'a> {
    pub blog_posts: &'a [BlogPost],
    pub tweets: &'a [Tweet],
    pub linkedin_posts: &'a [LinkedInPost],
}

impl<'a> ContentBundle<'a> {
    pub fn new(
        blog_posts: &'a [BlogPost],
        tweets: &'a [Tweet],
        linkedin_posts: &'a [LinkedInPost],
    ) -> Self {
        Self {
            blog_posts,
            tweets,
            linkedin_posts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blog_posts.is_empty() && self.tweets.is_empty() && self.linkedin_posts.is_empty()
    }
}
