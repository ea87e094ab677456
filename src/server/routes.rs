//! HTTP handlers: info, readiness and run trigger.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::pipeline::{Orchestrator, TaskId};

use super::AppState;

/// Errors surfaced by the HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The readiness check failed; no run was started.
    #[error("System is not healthy. Please check /health endpoint for details.")]
    NotReady,

    /// The run could not be scheduled.
    #[error("Failed to start automation: {0}")]
    Dispatch(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotReady => StatusCode::PRECONDITION_FAILED,
            ApiError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Schedules a pipeline run without waiting for it.
pub trait RunLauncher: Send + Sync {
    fn launch(&self, task_id: TaskId) -> Result<(), ApiError>;
}

/// Runs the orchestrator on a detached tokio task.
#[derive(Debug, Clone)]
pub struct BackgroundLauncher {
    orchestrator: Arc<Orchestrator>,
}

impl BackgroundLauncher {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

impl RunLauncher for BackgroundLauncher {
    fn launch(&self, task_id: TaskId) -> Result<(), ApiError> {
        let handle =
            tokio::runtime::Handle::try_current().map_err(|e| ApiError::Dispatch(e.to_string()))?;
        let orchestrator = Arc::clone(&self.orchestrator);
        handle.spawn(async move {
            let record = orchestrator.run(task_id).await;
            tracing::info!(
                task_id = %record.task_id(),
                status = %record.status(),
                errors = record.errors().len(),
                "Background run finished"
            );
        });
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub status: String,
    pub message: String,
    pub task_id: String,
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Agentic Loop Content Automation API",
        "endpoints": ["/health", "/start"]
    }))
}

pub async fn health(State(state): State<AppState>) -> Response {
    let report = state.health.check_all().await;
    if report.healthy {
        Json(json!({ "status": "healthy", "details": report })).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy", "details": report })),
        )
            .into_response()
    }
}

pub async fn start(State(state): State<AppState>) -> Result<Json<StartResponse>, ApiError> {
    let report = state.health.check_all().await;
    if !report.healthy {
        tracing::warn!("Rejected start request: system not healthy");
        return Err(ApiError::NotReady);
    }

    let task_id = state.task_ids.next();
    state.launcher.launch(task_id.clone()).map_err(|e| {
        tracing::error!(task_id = %task_id, error = %e, "Failed to start automation");
        e
    })?;
    tracing::info!(task_id = %task_id, "Content automation started");

    Ok(Json(StartResponse {
        status: "started".to_string(),
        message: "Content automation process has been started".to_string(),
        task_id: task_id.to_string(),
    }))
}
