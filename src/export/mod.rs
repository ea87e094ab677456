//! Delivery of run results.
//!
//! At the end of every run the orchestrator turns its record into a
//! [`RunSummary`] plus JSON [`Attachment`]s and hands them to a
//! [`ResultSink`]. The production sink is [`EmailSink`].

pub mod email;
pub mod report;

pub use email::{EmailSink, ResultSink};
pub use report::{build_attachments, Attachment, ContentKind, RunSummary};
