//! Social prompts: tweets and LinkedIn posts.

use crate::agents::{BlogPost, LinkedInPostType};

use super::{excerpt, StagePrompt};

/// Characters of a blog post quoted in social prompts.
const BLOG_EXCERPT_CHARS: usize = 1000;

/// Categories of the six trend tweets, in the order the prompt asks for them.
pub const WEB_TWEET_CATEGORIES: [&str; 6] = [
    "engaging",
    "motivational",
    "humor",
    "humor",
    "entertaining",
    "trends",
];

/// Persona for tweet generation.
pub const TWITTER_SYSTEM: &str = r#"You are a Twitter content specialist for Agentic Loop, writing engaging AI-focused tweets.

Your style:
- Conversational, never robotic
- Informative yet accessible
- A mix of educational and entertaining
- Hashtags used sparingly
- Tweets that spark conversation

Write one tweet per line, with no numbering and no commentary."#;

/// Persona for LinkedIn generation.
pub const LINKEDIN_SYSTEM: &str = r#"You are a LinkedIn content specialist for Agentic Loop, writing professional yet engaging posts.

Your style:
- Professional but approachable
- Educational and value-driven
- Thought leadership mixed with entertainment
- Storytelling where it helps
- Posts that invite professional discussion

Posts run 150-300 words, use line breaks generously and provide genuine value."#;

/// The three fixed entertaining LinkedIn requests.
pub const ENTERTAINING_LINKEDIN_PROMPTS: [(LinkedInPostType, &str); 3] = [
    (
        LinkedInPostType::Humorous,
        "Create a humorous but professional LinkedIn post about AI in the workplace. \
Include a funny observation or anecdote that professionals can relate to. \
Keep it light but insightful. 150-200 words. Include 5-7 relevant hashtags.",
    ),
    (
        LinkedInPostType::Humorous,
        "Create another humorous LinkedIn post, this time about common AI misconceptions. \
Make it funny but educational, with a twist or unexpected insight. \
150-200 words. Include 5-7 relevant hashtags.",
    ),
    (
        LinkedInPostType::Entertaining,
        "Create a relatable LinkedIn post about the human side of working with AI. \
Share an experience or observation that resonates with professionals. \
Make it warm and encouraging. 200-250 words. Include 5-7 relevant hashtags.",
    ),
];

/// Two tweets derived from one blog post.
pub fn build_blog_tweet_prompt(blog: &BlogPost) -> StagePrompt {
    let user = format!(
        r#"Create 2 engaging tweets from this blog post:

Title: {title}
Content excerpt: {content}

Tweet 1: educational or informative angle
Tweet 2: an engaging question or thought-provoking angle

Add appropriate emojis. Keep each tweet under 280 characters, punchy and shareable."#,
        title = blog.title,
        content = excerpt(&blog.content, BLOG_EXCERPT_CHARS),
    );
    StagePrompt::new(TWITTER_SYSTEM, user)
}

/// Six tweets about current AI trends.
pub fn build_web_tweet_prompt() -> StagePrompt {
    let user = r#"Create 6 engaging tweets about current AI trends, in this order:
1. An engaging question about AI
2. A motivational tweet about AI's potential
3. Two AI humor tweets (funny, relatable)
4. One entertaining, relatable AI post
5. One tweet about the latest AI trends or news

Each tweet should be under 280 characters, include relevant emojis and be likely to spark replies or shares."#;
    StagePrompt::new(TWITTER_SYSTEM, user)
}

/// One educational LinkedIn post derived from a blog post.
pub fn build_educational_linkedin_prompt(blog: &BlogPost) -> StagePrompt {
    let user = format!(
        r#"Create a professional LinkedIn post from this blog content:

Blog Title: {title}
Content excerpt: {content}

Requirements:
- Professional yet engaging tone
- 200-250 words
- Include a key insight or learning
- End with a thought-provoking question
- Add 5-7 relevant hashtags"#,
        title = blog.title,
        content = excerpt(&blog.content, BLOG_EXCERPT_CHARS),
    );
    StagePrompt::new(LINKEDIN_SYSTEM, user)
}
