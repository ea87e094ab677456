//! Spreadsheet row source.
//!
//! Reads topic rows from a Google Sheets range through the Sheets REST API.
//! The first sheet row holds the headers; every following row becomes a
//! [`Row`] keyed by the normalised header names.
//!
//! The collector never fails: a missing configuration, a transport or API
//! error, or an empty sheet all fall back to [`sample_rows`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::agents::Row;
use crate::error::SourceError;
use crate::pipeline::SheetsConfig;

/// Google Sheets REST API base URL.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider of the topic rows a run starts from.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Returns the rows for one run. Never fails; sources fall back to
    /// built-in rows instead.
    async fn get_data(&self) -> Vec<Row>;
}

/// Body of a `values.get` response.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Row source backed by a Google Sheets range.
pub struct SpreadsheetCollector {
    http_client: Client,
    api_base: String,
    config: SheetsConfig,
}

impl std::fmt::Debug for SpreadsheetCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpreadsheetCollector")
            .field("api_base", &self.api_base)
            .field("spreadsheet_id", &self.config.spreadsheet_id)
            .field("range", &self.config.range)
            .finish_non_exhaustive()
    }
}

impl SpreadsheetCollector {
    /// Creates a collector for the configured sheet.
    pub fn new(config: SheetsConfig) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http_client,
            api_base: SHEETS_API_BASE.to_string(),
            config,
        }
    }

    /// Points the collector at a different API base.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether a sheet id and credential are present.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Fetches and parses the configured range.
    pub async fn fetch_rows(&self) -> Result<Vec<Row>, SourceError> {
        let spreadsheet_id = self.config.spreadsheet_id.as_deref().ok_or_else(|| {
            SourceError::NotConfigured("GOOGLE_SHEETS_ID is not set".to_string())
        })?;
        if self.config.api_key.is_none() && self.config.access_token.is_none() {
            return Err(SourceError::NotConfigured(
                "set GOOGLE_SHEETS_API_KEY or GOOGLE_SHEETS_ACCESS_TOKEN".to_string(),
            ));
        }

        let mut url = format!(
            "{}/{}/values/{}",
            self.api_base,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(&self.config.range)
        );
        if let Some(ref key) = self.config.api_key {
            url.push_str(&format!("?key={}", urlencoding::encode(key)));
        }

        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", "agentic-loop/1.0");
        if let Some(ref token) = self.config.access_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::ApiError {
                code: status.as_u16(),
                message,
            });
        }

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        let values = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        let rows = parse_values(values);
        if rows.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(rows)
    }
}

#[async_trait]
impl RowSource for SpreadsheetCollector {
    async fn get_data(&self) -> Vec<Row> {
        if !self.is_configured() {
            tracing::warn!("Spreadsheet not configured, using sample rows");
            return sample_rows();
        }

        match self.fetch_rows().await {
            Ok(rows) => {
                tracing::info!(rows = rows.len(), "Fetched spreadsheet rows");
                rows
            }
            Err(SourceError::Empty) => {
                tracing::warn!("Spreadsheet has no data rows, using sample rows");
                sample_rows()
            }
            Err(e) => {
                tracing::error!(error = %e, "Spreadsheet fetch failed, using sample rows");
                sample_rows()
            }
        }
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Turns a header row plus data rows into [`Row`]s.
///
/// Headers are lower-cased with spaces replaced by `_`. Cells missing from
/// short rows become empty strings; cells beyond the header width are
/// dropped.
pub fn parse_values(values: Vec<Vec<String>>) -> Vec<Row> {
    let mut values = values.into_iter();
    let Some(header_row) = values.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|h| h.trim().to_lowercase().replace(' ', "_"))
        .collect();

    values
        .map(|cells| {
            let mut cells = cells.into_iter();
            headers
                .iter()
                .map(|header| (header.clone(), cells.next().unwrap_or_default()))
                .collect()
        })
        .collect()
}

/// The three built-in rows used whenever the sheet cannot be read.
pub fn sample_rows() -> Vec<Row> {
    vec![
        Row::new()
            .with("topic", "AI Agents and Automation")
            .with(
                "links",
                "https://arxiv.org/papers/ai-agents,https://openai.com/research",
            )
            .with("description", "Latest developments in autonomous AI agents")
            .with("keywords", "AI agents, automation, LLM, multi-agent systems"),
        Row::new()
            .with("topic", "Machine Learning in Production")
            .with("links", "https://ml-ops.org/,https://papers.nips.cc/")
            .with("description", "Best practices for deploying ML models")
            .with("keywords", "MLOps, production ML, model deployment"),
        Row::new()
            .with("topic", "Future of Human-AI Collaboration")
            .with(
                "links",
                "https://hai.stanford.edu/research,https://deepmind.com/blog",
            )
            .with("description", "How humans and AI will work together")
            .with("keywords", "human-AI collaboration, augmented intelligence"),
    ]
}

/// Fixed in-memory row source.
#[derive(Debug, Clone, Default)]
pub struct StaticRowSource {
    rows: Vec<Row>,
}

impl StaticRowSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl RowSource for StaticRowSource {
    async fn get_data(&self) -> Vec<Row> {
        self.rows.clone()
    }
}
