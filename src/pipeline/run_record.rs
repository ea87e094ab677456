//! Per-run state: task ids, phases and the run record.
//!
//! A [`RunRecord`] is created when a run starts, filled in by the
//! orchestrator as each stage returns, and read once by the delivery step.
//! Its status moves from `pending` to exactly one of `completed` or
//! `failed`; the error log only ever grows.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::agents::{BlogPost, LinkedInPost, OptimizedContent, ResearchReport, Row, Tweet};

/// Errors raised by run record transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunRecordError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: RunStatus, to: RunStatus },
}

/// Identifier of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Base id for a run started at `at`: `task_%Y%m%d_%H%M%S`.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.format("task_%Y%m%d_%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out timestamp-derived task ids that stay unique within the process.
///
/// Ids allocated within the same second get a `_2`, `_3`, ... suffix.
#[derive(Debug, Default)]
pub struct TaskIdAllocator {
    last: Mutex<Option<(String, u32)>>,
}

impl TaskIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id for a run starting now.
    pub fn next(&self) -> TaskId {
        self.next_at(Utc::now())
    }

    /// Allocates an id for a run starting at `at`.
    pub fn next_at(&self, at: DateTime<Utc>) -> TaskId {
        let base = TaskId::from_timestamp(at).0;
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let sequence = match last.as_ref() {
            Some((prev, n)) if *prev == base => n + 1,
            _ => 1,
        };
        *last = Some((base.clone(), sequence));

        if sequence == 1 {
            TaskId(base)
        } else {
            TaskId(format!("{}_{}", base, sequence))
        }
    }
}

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Pending)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run reacts to a stage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the error and stop the run.
    FailFast,
    /// Record the error and carry on.
    FailSoft,
}

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Spreadsheet,
    Research,
    BlogWriting,
    SocialMedia,
    Optimization,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Spreadsheet,
        Phase::Research,
        Phase::BlogWriting,
        Phase::SocialMedia,
        Phase::Optimization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Spreadsheet => "spreadsheet",
            Phase::Research => "research",
            Phase::BlogWriting => "blog_writing",
            Phase::SocialMedia => "social_media",
            Phase::Optimization => "optimization",
        }
    }

    /// Only optimization is allowed to fail without failing the run.
    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            Phase::Optimization => FailurePolicy::FailSoft,
            _ => FailurePolicy::FailFast,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the run's error log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageError {
    pub phase: Phase,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Accumulated state of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    task_id: TaskId,
    status: RunStatus,
    spreadsheet_data: Option<Vec<Row>>,
    research_data: Option<ResearchReport>,
    blog_posts: Option<Vec<BlogPost>>,
    tweets: Option<Vec<Tweet>>,
    linkedin_posts: Option<Vec<LinkedInPost>>,
    optimized_content: Option<OptimizedContent>,
    errors: Vec<StageError>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
}

impl RunRecord {
    /// Starts a pending record.
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: RunStatus::Pending,
            spreadsheet_data: None,
            research_data: None,
            blog_posts: None,
            tweets: None,
            linkedin_posts: None,
            optimized_content: None,
            errors: Vec::new(),
            start_time: Utc::now(),
            end_time: None,
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn spreadsheet_data(&self) -> Option<&[Row]> {
        self.spreadsheet_data.as_deref()
    }

    pub fn research_data(&self) -> Option<&ResearchReport> {
        self.research_data.as_ref()
    }

    pub fn blog_posts(&self) -> Option<&[BlogPost]> {
        self.blog_posts.as_deref()
    }

    pub fn tweets(&self) -> Option<&[Tweet]> {
        self.tweets.as_deref()
    }

    pub fn linkedin_posts(&self) -> Option<&[LinkedInPost]> {
        self.linkedin_posts.as_deref()
    }

    pub fn optimized_content(&self) -> Option<&OptimizedContent> {
        self.optimized_content.as_ref()
    }

    pub fn errors(&self) -> &[StageError] {
        &self.errors
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn set_spreadsheet_data(&mut self, rows: Vec<Row>) {
        self.spreadsheet_data = Some(rows);
    }

    pub fn set_research_data(&mut self, report: ResearchReport) {
        self.research_data = Some(report);
    }

    pub fn set_blog_posts(&mut self, posts: Vec<BlogPost>) {
        self.blog_posts = Some(posts);
    }

    pub fn set_social_content(&mut self, tweets: Vec<Tweet>, linkedin_posts: Vec<LinkedInPost>) {
        self.tweets = Some(tweets);
        self.linkedin_posts = Some(linkedin_posts);
    }

    pub fn set_optimized_content(&mut self, content: OptimizedContent) {
        self.optimized_content = Some(content);
    }

    /// Appends an error log entry stamped with the current time.
    pub fn record_error(&mut self, phase: Phase, error: impl Into<String>) {
        self.errors.push(StageError {
            phase,
            error: error.into(),
            timestamp: Utc::now(),
        });
    }

    /// Moves the record to `completed` and stamps the end time.
    pub fn complete(&mut self) -> Result<(), RunRecordError> {
        self.finish(RunStatus::Completed)
    }

    /// Moves the record to `failed` and stamps the end time.
    pub fn fail(&mut self) -> Result<(), RunRecordError> {
        self.finish(RunStatus::Failed)
    }

    fn finish(&mut self, to: RunStatus) -> Result<(), RunRecordError> {
        if self.status.is_terminal() {
            return Err(RunRecordError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.end_time = Some(Utc::now());
        Ok(())
    }
}
