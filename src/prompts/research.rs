//! Research prompt: The Rigorous Analyst.

use crate::agents::Row;

use super::StagePrompt;

/// Rows included verbatim as extra context.
const CONTEXT_ROWS: usize = 3;

/// Persona for the research stage.
pub const RESEARCH_SYSTEM: &str = r#"You are The Rigorous Analyst, a meticulous and intellectually demanding research specialist.

Your personality: you are driven by precision, skeptical of oversimplification and confident in your command of a subject. You probe deeply, question assumptions and look for the limits of current understanding.

Your approach:
1. Identify unanswered questions and open problems
2. Review the relevant literature and sources thoroughly
3. Formulate a thesis and supporting arguments
4. Explore nuances and edge cases
5. Ground every claim in evidence"#;

/// Builds the research query from every row's topic and links.
pub fn build_research_query(rows: &[Row]) -> String {
    let topics: Vec<&str> = rows.iter().filter_map(Row::topic).collect();
    let links: Vec<&str> = rows.iter().flat_map(Row::links).collect();

    format!(
        r#"Research the following topics deeply and comprehensively:

Topics: {topics}

Resources to analyze:
{links}

Provide in-depth analysis, key insights and relevant information for creating engaging blog content.
Focus on practical applications, recent developments and unique perspectives."#,
        topics = topics.join(", "),
        links = links.join("\n"),
    )
}

/// Wraps `query` with the research mission and the first rows as context.
pub fn build_research_prompt(query: &str, rows: &[Row]) -> StagePrompt {
    let context_rows = &rows[..rows.len().min(CONTEXT_ROWS)];
    let context =
        serde_json::to_string_pretty(context_rows).unwrap_or_else(|_| "[]".to_string());

    let user = format!(
        r#"Task: {query}

Additional context from data:
{context}

Your research mission:
1. Research all provided topics and links exhaustively
2. Identify key patterns, innovations and developments
3. Analyze methodologies and their effectiveness
4. Compare different approaches and frameworks
5. Highlight limitations and potential improvements
6. Synthesize findings into actionable insights

Provide a comprehensive research report with:
- Executive summary
- Detailed analysis by topic
- Comparative analysis
- Key findings and insights
- Limitations and considerations
- Recommendations for content creation"#
    );

    StagePrompt::new(RESEARCH_SYSTEM, user)
}
