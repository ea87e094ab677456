//! Pipeline orchestrator for one content run.
//!
//! The orchestrator coordinates:
//! - Row retrieval from the spreadsheet source
//! - Research, blog writing and social-media generation (fail-fast)
//! - The editorial pass (fail-soft)
//! - Exactly one delivery of the report, whatever the outcome

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::agents::{
    AgentError, AgentResult, BlogPost, BlogWriterAgent, ContentBundle, LinkedInAgent, LinkedInPost,
    OptimizingAgent, ResearchAgent, Tweet, TwitterAgent,
};
use crate::collectors::{RowSource, SpreadsheetCollector};
use crate::error::LlmError;
use crate::export::{build_attachments, EmailSink, ResultSink, RunSummary};
use crate::llm::{LlmRole, RoleClients};

use super::config::PipelineConfig;
use super::run_record::{FailurePolicy, Phase, RunRecord, TaskId};

/// Drives the five stages of a run against its own [`RunRecord`].
pub struct Orchestrator {
    research_agent: ResearchAgent,
    blog_writer: BlogWriterAgent,
    twitter_agent: TwitterAgent,
    linkedin_agent: LinkedInAgent,
    optimizing_agent: OptimizingAgent,
    row_source: Arc<dyn RowSource>,
    sink: Arc<dyn ResultSink>,
    social_stagger: Duration,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("social_stagger", &self.social_stagger)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator; each stage uses the client of its role.
    pub fn new(
        clients: &RoleClients,
        row_source: Arc<dyn RowSource>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            research_agent: ResearchAgent::with_defaults(clients.get(LlmRole::Research)),
            blog_writer: BlogWriterAgent::with_defaults(clients.get(LlmRole::Content)),
            twitter_agent: TwitterAgent::with_defaults(clients.get(LlmRole::Social)),
            linkedin_agent: LinkedInAgent::with_defaults(clients.get(LlmRole::Social)),
            optimizing_agent: OptimizingAgent::with_defaults(clients.get(LlmRole::Optimization)),
            row_source,
            sink,
            social_stagger: Duration::ZERO,
        }
    }

    /// Builds the production wiring: LiteLLM clients, the spreadsheet
    /// collector and the email sink.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, LlmError> {
        let clients = RoleClients::from_config(config)?;
        let row_source = Arc::new(SpreadsheetCollector::new(config.sheets.clone()));
        let sink = Arc::new(EmailSink::new(config.smtp.clone()));
        Ok(Self::new(&clients, row_source, sink).with_social_stagger(config.social_stagger))
    }

    /// Delay between dispatching the tweet and LinkedIn sub-tasks.
    pub fn with_social_stagger(mut self, stagger: Duration) -> Self {
        self.social_stagger = stagger;
        self
    }

    /// Runs the whole pipeline and returns the finished record.
    ///
    /// Never fails: stage errors end up in the record's error log and
    /// delivery errors are logged. A panicking stage is recorded against the
    /// phase it interrupted. The report is delivered exactly once.
    pub async fn run(&self, task_id: TaskId) -> RunRecord {
        let mut record = RunRecord::new(task_id);
        tracing::info!(task_id = %record.task_id(), "Starting orchestration");

        let mut current = Phase::Spreadsheet;
        let outcome = AssertUnwindSafe(self.execute(&mut record, &mut current))
            .catch_unwind()
            .await;
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(payload) => {
                let err = AgentError::StageFailed {
                    stage: current.to_string(),
                    reason: panic_message(&*payload),
                };
                check::<()>(&mut record, current, Err(err)).or_else(|phase| {
                    match phase.failure_policy() {
                        FailurePolicy::FailFast => Err(phase),
                        FailurePolicy::FailSoft => Ok(()),
                    }
                })
            }
        };

        let transition = match outcome {
            Ok(()) => {
                tracing::info!(task_id = %record.task_id(), "Orchestration completed");
                record.complete()
            }
            Err(phase) => {
                tracing::error!(task_id = %record.task_id(), phase = %phase, "Orchestration failed");
                record.fail()
            }
        };
        if let Err(e) = transition {
            tracing::error!(task_id = %record.task_id(), error = %e, "Run record already finished");
        }

        self.deliver(&record).await;
        record
    }

    /// Runs the stages in order; `Err` names the phase that stopped the run.
    /// `current` tracks the phase in progress.
    async fn execute(&self, record: &mut RunRecord, current: &mut Phase) -> Result<(), Phase> {
        *current = Phase::Spreadsheet;
        tracing::info!(phase = %Phase::Spreadsheet, "Fetching spreadsheet data");
        let rows = self.row_source.get_data().await;
        tracing::info!(rows = rows.len(), "Retrieved spreadsheet rows");
        record.set_spreadsheet_data(rows.clone());

        *current = Phase::Research;
        tracing::info!(phase = %Phase::Research, "Starting research phase");
        let result = self.research_agent.research(&rows).await;
        let research = check(record, Phase::Research, result)?;
        record.set_research_data(research.clone());

        *current = Phase::BlogWriting;
        tracing::info!(phase = %Phase::BlogWriting, "Starting blog writing phase");
        let result = self.blog_writer.write_posts(&research, &rows).await;
        let blogs = check(record, Phase::BlogWriting, result)?;
        tracing::info!(blog_posts = blogs.len(), "Blog writing phase completed");
        record.set_blog_posts(blogs.clone());

        *current = Phase::SocialMedia;
        tracing::info!(phase = %Phase::SocialMedia, "Starting social media phase");
        let result = self.run_social_stage(&blogs).await;
        let (tweets, linkedin_posts) = check(record, Phase::SocialMedia, result)?;
        tracing::info!(
            tweets = tweets.len(),
            linkedin_posts = linkedin_posts.len(),
            "Social media phase completed"
        );
        record.set_social_content(tweets.clone(), linkedin_posts.clone());

        *current = Phase::Optimization;
        tracing::info!(phase = %Phase::Optimization, "Starting optimization phase");
        let bundle = ContentBundle::new(&blogs, &tweets, &linkedin_posts);
        let result = self.optimizing_agent.optimize(bundle).await;
        if let Ok(optimized) = check(record, Phase::Optimization, result) {
            record.set_optimized_content(optimized);
        }

        Ok(())
    }

    /// Tweets and LinkedIn posts run concurrently; the LinkedIn sub-task
    /// starts after the configured stagger.
    async fn run_social_stage(
        &self,
        blogs: &[BlogPost],
    ) -> AgentResult<(Vec<Tweet>, Vec<LinkedInPost>)> {
        let tweets = self.twitter_agent.generate_tweets(blogs);
        let linkedin = async {
            if !self.social_stagger.is_zero() {
                tracing::info!(
                    delay_secs = self.social_stagger.as_secs_f64(),
                    "Staggering LinkedIn generation"
                );
                tokio::time::sleep(self.social_stagger).await;
            }
            self.linkedin_agent.generate_posts(blogs).await
        };
        tokio::try_join!(tweets, linkedin)
    }

    async fn deliver(&self, record: &RunRecord) {
        let attachments = match build_attachments(record) {
            Ok(attachments) => attachments,
            Err(e) => {
                tracing::error!(task_id = %record.task_id(), error = %e, "Failed to serialize attachments");
                Vec::new()
            }
        };
        let summary = RunSummary::new(record, &attachments);

        match self.sink.send_results(&summary, &attachments).await {
            Ok(()) => tracing::info!(
                task_id = %record.task_id(),
                attachments = attachments.len(),
                "Results delivered"
            ),
            Err(e) => {
                tracing::error!(task_id = %record.task_id(), error = %e, "Failed to deliver results")
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

/// Logs a stage failure once, then applies the phase's failure policy.
fn check<T>(record: &mut RunRecord, phase: Phase, result: AgentResult<T>) -> Result<T, Phase> {
    result.map_err(|e| {
        record.record_error(phase, e.to_string());
        match phase.failure_policy() {
            FailurePolicy::FailFast => {
                tracing::error!(phase = %phase, error = %e, "Stage failed");
            }
            FailurePolicy::FailSoft => {
                tracing::warn!(phase = %phase, error = %e, "Stage failed, continuing");
            }
        }
        phase
    })
}
