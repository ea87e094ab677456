//! Run report: summary, HTML body and JSON attachments.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::DeliveryError;
use crate::pipeline::{RunRecord, RunStatus, StageError, TaskId};

/// HTML body of the report email.
const REPORT_TEMPLATE: &str = r#"<html>
<head>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; }
        .header { background-color: #f4f4f4; padding: 20px; border-radius: 5px; }
        .status { color: {{ status_color }}; font-weight: bold; }
        .section { margin: 20px 0; }
        .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; }
    </style>
</head>
<body>
    <div class="header">
        <h2>Agentic Loop Content Generation Report</h2>
        <p><strong>Task ID:</strong> {{ task_id }}</p>
        <p><strong>Status:</strong> <span class="status">{{ status | upper }}</span></p>
        <p><strong>Start Time:</strong> {{ start_time }}</p>
        <p><strong>End Time:</strong> {{ end_time }}</p>
    </div>
    <div class="section">
        <h3>Generated Content:</h3>
{% if content | length > 0 %}
        <p>Please find the generated content in the attached JSON files:</p>
        <ul>
{% for entry in content %}
            <li>{{ entry.label }} ({{ entry.count }} {{ entry.unit }})</li>
{% endfor %}
        </ul>
{% else %}
        <p>No content was generated for this run.</p>
{% endif %}
    </div>
{% if errors | length > 0 %}
    <div class="section">
        <h3>Errors Encountered:</h3>
        <ul style="color: red;">
{% for error in errors %}
            <li><strong>{{ error.phase }}</strong>: {{ error.error }}</li>
{% endfor %}
        </ul>
    </div>
{% endif %}
    <div class="footer">
        <p><em>This is an automated email from Agentic Loop Content Automation System.</em></p>
        <p><em>Generated on {{ generated_at }}</em></p>
    </div>
</body>
</html>
"#;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Kind of content a run delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    BlogPosts,
    Tweets,
    LinkedinPosts,
}

impl ContentKind {
    /// Prefix of the attachment file name.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ContentKind::BlogPosts => "blog_posts",
            ContentKind::Tweets => "tweets",
            ContentKind::LinkedinPosts => "linkedin_posts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::BlogPosts => "Blog Posts",
            ContentKind::Tweets => "Twitter Content",
            ContentKind::LinkedinPosts => "LinkedIn Posts",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            ContentKind::BlogPosts => "articles",
            ContentKind::Tweets => "tweets",
            ContentKind::LinkedinPosts => "posts",
        }
    }
}

/// A JSON file attached to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: ContentKind,
    pub filename: String,
    pub content: String,
    pub item_count: usize,
}

impl Attachment {
    /// Serializes `items` as pretty JSON named `{kind}_{task_id}.json`.
    pub fn json<T: Serialize>(
        kind: ContentKind,
        task_id: &TaskId,
        items: &[T],
    ) -> Result<Self, DeliveryError> {
        Ok(Self {
            kind,
            filename: format!("{}_{}.json", kind.file_stem(), task_id),
            content: serde_json::to_string_pretty(items)?,
            item_count: items.len(),
        })
    }
}

/// Builds one attachment per content kind that has items.
///
/// Optimized collections win over raw ones when they are non-empty, so a
/// failed editorial pass still ships the raw content.
pub fn build_attachments(record: &RunRecord) -> Result<Vec<Attachment>, DeliveryError> {
    let task_id = record.task_id();
    let optimized = record.optimized_content();
    let mut attachments = Vec::new();

    match (optimized, record.blog_posts()) {
        (Some(o), _) if !o.blog_posts.is_empty() => {
            attachments.push(Attachment::json(ContentKind::BlogPosts, task_id, &o.blog_posts)?)
        }
        (_, Some(raw)) if !raw.is_empty() => {
            attachments.push(Attachment::json(ContentKind::BlogPosts, task_id, raw)?)
        }
        _ => {}
    }

    match (optimized, record.tweets()) {
        (Some(o), _) if !o.tweets.is_empty() => {
            attachments.push(Attachment::json(ContentKind::Tweets, task_id, &o.tweets)?)
        }
        (_, Some(raw)) if !raw.is_empty() => {
            attachments.push(Attachment::json(ContentKind::Tweets, task_id, raw)?)
        }
        _ => {}
    }

    match (optimized, record.linkedin_posts()) {
        (Some(o), _) if !o.linkedin_posts.is_empty() => attachments.push(Attachment::json(
            ContentKind::LinkedinPosts,
            task_id,
            &o.linkedin_posts,
        )?),
        (_, Some(raw)) if !raw.is_empty() => {
            attachments.push(Attachment::json(ContentKind::LinkedinPosts, task_id, raw)?)
        }
        _ => {}
    }

    Ok(attachments)
}

#[derive(Debug, Clone, Serialize)]
struct ContentLine {
    label: &'static str,
    count: usize,
    unit: &'static str,
}

/// What the report says about a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub task_id: TaskId,
    pub status: RunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub errors: Vec<StageError>,
    content: Vec<ContentLine>,
}

impl RunSummary {
    /// Summarises `record`, listing the kinds present in `attachments`.
    pub fn new(record: &RunRecord, attachments: &[Attachment]) -> Self {
        Self {
            task_id: record.task_id().clone(),
            status: record.status(),
            start_time: record.start_time(),
            end_time: record.end_time(),
            errors: record.errors().to_vec(),
            content: attachments
                .iter()
                .map(|a| ContentLine {
                    label: a.kind.label(),
                    count: a.item_count,
                    unit: a.kind.unit(),
                })
                .collect(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Agentic Loop Content Generation - Task {}", self.task_id)
    }

    /// Renders the HTML body, with user-facing text escaped.
    pub fn render_html(&self) -> Result<String, DeliveryError> {
        self.render_html_at(Utc::now())
    }

    fn render_html_at(&self, generated_at: DateTime<Utc>) -> Result<String, DeliveryError> {
        let status_color = match self.status {
            RunStatus::Completed => "green",
            _ => "red",
        };
        let errors: Vec<serde_json::Value> = self
            .errors
            .iter()
            .map(|e| serde_json::json!({ "phase": e.phase.as_str(), "error": e.error }))
            .collect();

        let mut context = Context::new();
        context.insert("task_id", self.task_id.as_str());
        context.insert("status", self.status.as_str());
        context.insert("status_color", status_color);
        context.insert("start_time", &self.start_time.format(TIME_FORMAT).to_string());
        context.insert(
            "end_time",
            &self
                .end_time
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        );
        context.insert("content", &self.content);
        context.insert("errors", &errors);
        context.insert("generated_at", &generated_at.format(TIME_FORMAT).to_string());

        Tera::one_off(REPORT_TEMPLATE, &context, true)
            .map_err(|e| DeliveryError::Render(e.to_string()))
    }
}
