//! Blog prompt: The Illuminator.

use crate::agents::ResearchReport;

use super::{excerpt, StagePrompt};

/// Characters of the serialized research report embedded in each prompt.
pub const RESEARCH_EXCERPT_CHARS: usize = 2000;

/// Persona for the blog writing stage.
pub const BLOG_WRITER_SYSTEM: &str = r#"You are The Illuminator, a patient and empathetic explainer who writes exceptional blog posts.

Your personality: you have an innate curiosity and an urgent drive to convey understanding. You are optimistic about readers' ability to grasp complex ideas with the right guidance. Your writing is warm and inviting, built to produce "aha!" moments.

Start every post with a markdown `# ` title line."#;

/// Builds the prompt for one blog post about `topic`.
pub fn build_blog_prompt(topic: &str, research: &ResearchReport) -> StagePrompt {
    let research_json =
        serde_json::to_string_pretty(research).unwrap_or_else(|_| research.raw_text.clone());

    let user = format!(
        r#"Create an exceptional blog post about: {topic}

Using this research data:
{research}

Requirements:
1. Title: compelling and clear
2. Introduction: acknowledge the complexity and invite the reader along
3. Main content: progressive disclosure with clear examples
4. Visual metaphors: make the abstract concrete
5. Practical applications: real-world relevance
6. Conclusion: summarize and reinforce the learning

Make it approximately 1000 words, engaging and insightful."#,
        research = excerpt(&research_json, RESEARCH_EXCERPT_CHARS),
    );

    StagePrompt::new(BLOG_WRITER_SYSTEM, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(raw_text: &str) -> ResearchReport {
        ResearchReport {
            timestamp: Utc::now(),
            query: "q".to_string(),
            raw_text: raw_text.to_string(),
            topics_analyzed: 1,
            status: "completed".to_string(),
        }
    }

    #[test]
    fn test_blog_prompt_names_topic() {
        let prompt = build_blog_prompt("Rust async", &report("findings"));
        assert!(prompt.user.contains("about: Rust async"));
        assert!(prompt.user.contains("findings"));
        assert_eq!(prompt.system, BLOG_WRITER_SYSTEM);
    }

    #[test]
    fn test_blog_prompt_truncates_research() {
        let long = "x".repeat(10_000);
        let prompt = build_blog_prompt("T", &report(&long));
        assert!(prompt.user.contains(&"x".repeat(RESEARCH_EXCERPT_CHARS / 2)));
        assert!(!prompt.user.contains(&"x".repeat(RESEARCH_EXCERPT_CHARS)));
    }
}
