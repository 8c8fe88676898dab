//! Periodic trigger handlers, one per lifecycle loop.
//!
//! Each handler runs its loop exactly once and reports the run's counters.
//! The external scheduler only needs the success/failure signal; the body
//! exists for operators reading logs and probes.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use datapump_orchestrator::LoopError;

use crate::http::responses::ErrorResponse;
use crate::state::AppState;

/// Task manager trigger.
pub async fn trigger_task_manager(State(state): State<Arc<AppState>>) -> Response {
    report_response("task-manager", state.task_manager().run_once().await)
}

/// Status checker trigger.
pub async fn trigger_status_checker(State(state): State<Arc<AppState>>) -> Response {
    report_response("status-checker", state.status_checker().run_once().await)
}

/// Worker reaper trigger.
pub async fn trigger_worker_reaper(State(state): State<Arc<AppState>>) -> Response {
    report_response("worker-reaper", state.worker_reaper().run_once().await)
}

/// Status store sweep trigger.
pub async fn trigger_status_sweep(State(state): State<Arc<AppState>>) -> Response {
    report_response("status-sweep", state.status_sweeper().run_once().await)
}

/// Storage sweep trigger.
pub async fn trigger_storage_sweep(State(state): State<Arc<AppState>>) -> Response {
    report_response("storage-sweep", state.storage_sweeper().run_once().await)
}

/// Map a loop outcome to an HTTP response.
fn report_response<T: Serialize>(trigger: &str, result: Result<T, LoopError>) -> Response {
    match result {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok", "report": report })),
        )
            .into_response(),
        Err(err) => {
            error!(trigger = trigger, error = %err, "Trigger invocation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}
