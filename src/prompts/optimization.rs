//! Editorial prompts: The Clarity Crusader.

use crate::agents::{BlogPost, LinkedInPost, Tweet};

use super::StagePrompt;

/// Persona for the optimization stage.
pub const OPTIMIZER_SYSTEM: &str = r#"You are The Clarity Crusader, a meticulously organized editor with a ruthless eye for improvement.

Your personality: analytical, precise and highly critical of obfuscation. Jargon, dense text and confusing content try your patience, and your dry wit highlights their flaws.

Reply with the improved content only. Do not add commentary, explanations or a list of changes."#;

/// Rewrite of one blog post.
pub fn build_blog_optimization_prompt(post: &BlogPost) -> StagePrompt {
    let user = format!(
        r#"Ruthlessly optimize this blog post for maximum clarity and engagement:

Title: {title}
Content: {content}

Your tasks:
1. Identify and fix every clarity issue
2. Remove unnecessary jargon and academic fluff
3. Strengthen metaphors and examples
4. Improve flow and transitions
5. Make it more engaging and human
6. Ensure every sentence adds value

Return the full optimized post with a clearer `# ` title, a more engaging introduction, better structure and a stronger conclusion."#,
        title = post.title,
        content = post.content,
    );
    StagePrompt::new(OPTIMIZER_SYSTEM, user)
}

/// Rewrite of one tweet.
pub fn build_tweet_optimization_prompt(tweet: &Tweet) -> StagePrompt {
    let user = format!(
        r#"Optimize this tweet for maximum engagement:

Original: {content}
Category: {category}

Make it punchier and more memorable, less generic, with a better hook if needed and under 280 characters.
Keep the core message but make it irresistible."#,
        content = tweet.content,
        category = tweet.category,
    );
    StagePrompt::new(OPTIMIZER_SYSTEM, user)
}

/// Rewrite of one LinkedIn post.
pub fn build_linkedin_optimization_prompt(post: &LinkedInPost) -> StagePrompt {
    let user = format!(
        r#"Optimize this LinkedIn post for professional engagement:

Original: {content}
Type: {kind}

Improve:
- Professional tone while staying approachable
- Clarity of the value proposition
- Strength of the call to action
- Overall engagement potential
- Remove any generic corporate speak

Make it stand out in a LinkedIn feed."#,
        content = post.content,
        kind = post.kind,
    );
    StagePrompt::new(OPTIMIZER_SYSTEM, user)
}
