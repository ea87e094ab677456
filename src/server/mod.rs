//! HTTP trigger service.
//!
//! Exposes three endpoints:
//! - `GET /`: static API description
//! - `GET /health`: per-collaborator readiness, 503 when unhealthy
//! - `POST /start`: starts a background run and returns its task id

pub mod health;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::pipeline::{Orchestrator, PipelineConfig, TaskIdAllocator};

pub use health::{
    ComponentHealth, ComponentStatus, EmailProbe, HealthChecker, HealthReport, LlmRoleProbe,
    Probe, SpreadsheetProbe,
};
pub use routes::{ApiError, BackgroundLauncher, RunLauncher, StartResponse};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub health: Arc<HealthChecker>,
    pub launcher: Arc<dyn RunLauncher>,
    pub task_ids: Arc<TaskIdAllocator>,
}

impl AppState {
    /// Production state: config-driven probes and a background launcher.
    pub fn from_config(config: &PipelineConfig) -> anyhow::Result<Self> {
        let orchestrator = Orchestrator::from_config(config)?;
        Ok(Self {
            health: Arc::new(HealthChecker::from_config(config)),
            launcher: Arc::new(BackgroundLauncher::new(Arc::new(orchestrator))),
            task_ids: Arc::new(TaskIdAllocator::new()),
        })
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/start", post(routes::start))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &PipelineConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Agentic Loop API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}
