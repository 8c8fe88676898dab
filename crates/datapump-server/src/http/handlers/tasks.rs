//! Task enqueue and status record handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, warn};

use datapump_core::{JobId, JobStatusRecord, Task, TaskId};
use datapump_orchestrator::Clock;

use crate::http::responses::{
    EnqueueRequest, EnqueueResponse, ErrorResponse, ReportJobRequest, StatusRecordResponse,
};
use crate::state::AppState;

impl EnqueueRequest {
    /// Build the queued task for this request.
    pub fn into_task(self) -> Task {
        Task::new(self.service, self.queue, self.region, self.entrypoint)
            .with_bindings(self.bucket, self.dataset)
            .with_params(self.params)
    }
}

/// Enqueue one task.
pub async fn enqueue_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnqueueRequest>,
) -> impl IntoResponse {
    let task = req.into_task();
    let task_id = task.id.clone();

    match state.queue.enqueue(task).await {
        Ok(()) => {
            info!(task_id = %task_id, "Task enqueued");
            (
                StatusCode::CREATED,
                Json(EnqueueResponse {
                    task_id: task_id.into_inner(),
                }),
            )
                .into_response()
        }
        Err(err) => {
            warn!(error = %err, "Enqueue failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Record a submitted remote job for a task.
///
/// Posted by a worker's execution path once the remote service accepts its
/// job; the status checker tracks the record from here. Reposting for the
/// same task replaces the record (last-write-wins).
pub async fn report_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportJobRequest>,
) -> impl IntoResponse {
    let record = JobStatusRecord::new(
        TaskId::new(req.task_id),
        JobId::new(req.job_id),
        state.clock.now(),
    );

    match state.store.upsert(record.clone()).await {
        Ok(()) => {
            info!(
                task_id = %record.task_id,
                job_id = ?record.job_id,
                "Remote job recorded"
            );
            StatusCode::CREATED.into_response()
        }
        Err(err) => {
            warn!(error = %err, "Job report failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// List all job status records as JSON.
pub async fn list_status_records(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_all().await {
        Ok(records) => {
            let response: Vec<StatusRecordResponse> = records
                .iter()
                .map(|r| StatusRecordResponse {
                    task_id: r.task_id.as_str().to_string(),
                    job_id: r.job_id.as_ref().map(|j| j.as_str().to_string()),
                    state: format!("{:?}", r.state).to_uppercase(),
                    error: r.error.clone(),
                    submitted_at: r.submitted_at.to_rfc3339(),
                    checked_at: r.checked_at.map(|t| t.to_rfc3339()),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_request_into_task() {
        let req = EnqueueRequest {
            service: "audience-report".to_string(),
            queue: "tasks-l1".to_string(),
            region: "europe-west1".to_string(),
            entrypoint: "run.sh".to_string(),
            bucket: "report-bucket".to_string(),
            dataset: "report_dataset".to_string(),
            params: serde_json::json!({ "advertiser_id": "1234" }),
        };

        let task = req.into_task();
        assert_eq!(task.service, "audience-report");
        assert_eq!(task.queue, "tasks-l1");
        assert_eq!(task.bindings.bucket, "report-bucket");
        assert_eq!(task.params["advertiser_id"], "1234");
    }
}
