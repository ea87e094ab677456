//! CLI command definitions for agentic-loop.
//!
//! `serve` runs the HTTP trigger service, `run` executes one pipeline run in
//! the foreground and `check` prints the readiness report.

use clap::Parser;
use tracing::info;

use crate::pipeline::{Orchestrator, PipelineConfig, TaskId, TaskIdAllocator};
use crate::server::{self, HealthChecker};

/// Multi-stage content automation pipeline driven by LLM agents.
#[derive(Parser)]
#[command(name = "agentic-loop")]
#[command(about = "Turn spreadsheet topics into blog posts, tweets and LinkedIn posts")]
#[command(version)]
#[command(
    long_about = "agentic-loop reads topics from a spreadsheet, researches them, writes three blog posts, derives twelve tweets and six LinkedIn posts, polishes everything and emails the result.\n\nConfiguration is read from the environment (and a .env file).\n\nExample usage:\n  agentic-loop serve --port 8000\n  agentic-loop run --json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Serve the HTTP trigger API.
    Serve(ServeArgs),

    /// Execute one pipeline run and wait for it to finish.
    Run(RunArgs),

    /// Print the readiness report; exits non-zero when unhealthy.
    Check,
}

/// Arguments for `agentic-loop serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides SERVER_HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides SERVER_PORT).
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for `agentic-loop run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Explicit task id; defaults to a timestamp-derived id.
    #[arg(long)]
    pub task_id: Option<String>,

    /// Print the full run record as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::from_env()?;
    match cli.command {
        Commands::Serve(args) => run_serve_command(config, args).await,
        Commands::Run(args) => run_pipeline_command(config, args).await,
        Commands::Check => run_check_command(config).await,
    }
}

async fn run_serve_command(mut config: PipelineConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    info!(config = ?config, "Starting HTTP service");
    server::serve(&config).await
}

async fn run_pipeline_command(config: PipelineConfig, args: RunArgs) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(&config)?;
    let task_id = match args.task_id {
        Some(id) => TaskId::new(id),
        None => TaskIdAllocator::new().next(),
    };

    let record = orchestrator.run(task_id).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Task:     {}", record.task_id());
        println!("Status:   {}", record.status());
        println!(
            "Content:  {} blog posts, {} tweets, {} LinkedIn posts{}",
            record.blog_posts().map_or(0, <[_]>::len),
            record.tweets().map_or(0, <[_]>::len),
            record.linkedin_posts().map_or(0, <[_]>::len),
            if record.optimized_content().is_some() {
                " (optimized)"
            } else {
                ""
            }
        );
        for error in record.errors() {
            println!("Error:    [{}] {}", error.phase, error.error);
        }
    }
    Ok(())
}

async fn run_check_command(config: PipelineConfig) -> anyhow::Result<()> {
    let report = HealthChecker::from_config(&config).check_all().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.healthy {
        anyhow::bail!("system is not healthy");
    }
    Ok(())
}
