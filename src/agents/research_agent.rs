//! Research Agent - The Rigorous Analyst.
//!
//! Builds a query from every topic row, sends it with the first rows as
//! context and records the raw reply as a [`ResearchReport`].
//!
//! # Example
//!
//! ```ignore
//! use agentic_loop::agents::{ResearchAgent, Row};
//!
//! let agent = ResearchAgent::with_defaults(llm_client);
//! let report = agent.research(&[Row::new().with("topic", "AI agents")]).await?;
//! println!("{}", report.raw_text);
//! ```

use std::sync::Arc;

use chrono::Utc;

use crate::llm::LlmProvider;
use crate::prompts::{build_research_prompt, build_research_query};

use super::error::AgentResult;
use super::types::{ResearchReport, Row};
use super::{generate_text, require_text};

/// Configuration for the Research Agent.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens for LLM response.
    pub max_tokens: u32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_tokens: 6000,
        }
    }
}

impl ResearchConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the temperature (clamped to 0.0-2.0).
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Sets the maximum tokens for responses.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Research stage.
pub struct ResearchAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: ResearchConfig,
}

impl std::fmt::Debug for ResearchAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResearchAgent {
    /// Creates a new Research Agent with the given LLM client and configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: ResearchConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new Research Agent with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, ResearchConfig::default())
    }

    /// Researches every topic and link in `rows`.
    pub async fn research(&self, rows: &[Row]) -> AgentResult<ResearchReport> {
        let query = build_research_query(rows);
        self.research_query(query, rows).await
    }

    /// Researches an explicit `query`, with `rows` as supporting context.
    ///
    /// `topics_analyzed` counts every row, usable topic or not.
    pub async fn research_query(&self, query: String, rows: &[Row]) -> AgentResult<ResearchReport> {
        tracing::info!(rows = rows.len(), "Starting research");

        let prompt = build_research_prompt(&query, rows);
        let raw_text = generate_text(
            self.llm_client.as_ref(),
            prompt,
            self.config.temperature,
            self.config.max_tokens,
        )
        .await?;
        let raw_text = require_text(raw_text, "research report")?;

        tracing::info!(chars = raw_text.len(), "Research completed");

        Ok(ResearchReport {
            timestamp: Utc::now(),
            query,
            raw_text,
            topics_analyzed: rows.len(),
            status: "completed".to_string(),
        })
    }
}
