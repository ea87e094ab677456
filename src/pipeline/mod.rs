//! Pipeline orchestration for content runs.
//!
//! # Architecture
//!
//! - **Config**: environment-driven settings for every collaborator
//! - **Run record**: task ids, phases and the per-run state
//! - **Orchestrator**: runs the stages and delivers the report
//!
//! # Pipeline Flow
//!
//! 1. **Spreadsheet**: topic rows are fetched (sample rows on any failure)
//! 2. **Research**: one analysis of every topic and link
//! 3. **Blog writing**: three long-form posts
//! 4. **Social media**: twelve tweets and six LinkedIn posts, concurrently
//! 5. **Optimization**: an editorial pass over everything; may fail softly
//! 6. **Delivery**: one report with JSON attachments, whatever happened
//!
//! # Example
//!
//! ```rust,ignore
//! use agentic_loop::pipeline::{Orchestrator, PipelineConfig, TaskIdAllocator};
//!
//! let config = PipelineConfig::from_env()?;
//! let orchestrator = Orchestrator::from_config(&config)?;
//!
//! let record = orchestrator.run(TaskIdAllocator::new().next()).await;
//! println!("{} finished as {}", record.task_id(), record.status());
//! ```

pub mod config;
pub mod orchestrator;
pub mod run_record;

pub use config::{ConfigError, PipelineConfig, SheetsConfig, SmtpConfig};
pub use orchestrator::Orchestrator;
pub use run_record::{
    FailurePolicy, Phase, RunRecord, RunRecordError, RunStatus, StageError, TaskId,
    TaskIdAllocator,
};
