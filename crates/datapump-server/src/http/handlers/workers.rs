//! Worker list handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::http::responses::{ErrorResponse, WorkerResponse};
use crate::state::AppState;

/// List active workers as JSON.
pub async fn list_workers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.provisioner.list_active().await {
        Ok(workers) => {
            let response: Vec<WorkerResponse> = workers
                .iter()
                .map(|w| WorkerResponse {
                    worker_id: w.id.as_str().to_string(),
                    task_id: w.task_id.as_str().to_string(),
                    region: w.region.clone(),
                    status: format!("{:?}", w.status).to_uppercase(),
                    created_at: w.created_at.to_rfc3339(),
                })
                .collect();
            Json(response).into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
    }
}
