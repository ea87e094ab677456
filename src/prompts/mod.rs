//! LLM prompts for the content pipeline.
//!
//! Each stage pairs a persona (system prompt) with a task-specific user
//! prompt built from upstream data:
//!
//! - [`research`] - The Rigorous Analyst: background research over topic rows
//! - [`blog`] - The Illuminator: long-form posts
//! - [`social`] - tweet and LinkedIn derivation
//! - [`optimization`] - The Clarity Crusader: the editorial pass
//!
//! # Usage
//!
//! ```no_run
//! use agentic_loop::agents::Row;
//! use agentic_loop::prompts::{build_research_prompt, build_research_query};
//!
//! let rows = vec![Row::new().with("topic", "AI agents")];
//! let query = build_research_query(&rows);
//! let prompt = build_research_prompt(&query, &rows);
//! assert!(prompt.user.contains("AI agents"));
//! ```

pub mod blog;
pub mod optimization;
pub mod research;
pub mod social;

pub use blog::{build_blog_prompt, BLOG_WRITER_SYSTEM, RESEARCH_EXCERPT_CHARS};
pub use optimization::{
    build_blog_optimization_prompt, build_linkedin_optimization_prompt,
    build_tweet_optimization_prompt, OPTIMIZER_SYSTEM,
};
pub use research::{build_research_prompt, build_research_query, RESEARCH_SYSTEM};
pub use social::{
    build_blog_tweet_prompt, build_educational_linkedin_prompt, build_web_tweet_prompt,
    ENTERTAINING_LINKEDIN_PROMPTS, LINKEDIN_SYSTEM, TWITTER_SYSTEM, WEB_TWEET_CATEGORIES,
};

/// A system/user prompt pair for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePrompt {
    /// Persona and standing instructions.
    pub system: String,
    /// The concrete request.
    pub user: String,
}

impl StagePrompt {
    /// Creates a new prompt pair.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_text_untouched() {
        assert_eq!(excerpt("hello", 10), "hello");
        assert_eq!(excerpt("", 3), "");
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "🚀🚀🚀🚀";
        assert_eq!(excerpt(text, 2), "🚀🚀");
        assert_eq!(excerpt("abcdef", 3), "abc");
    }
}
