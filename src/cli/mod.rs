//! Command-line interface for agentic-loop.
//!
//! Provides commands to serve the trigger API, run the pipeline once and
//! check readiness.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
