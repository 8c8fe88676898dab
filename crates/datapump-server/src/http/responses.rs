//! HTTP request and response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Enqueue types
// ============================================================================

/// Request body for the task enqueue endpoint.
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    /// Service this task belongs to.
    pub service: String,

    /// Queue to enqueue on.
    pub queue: String,

    /// Region the worker must be provisioned in.
    pub region: String,

    /// Execution entrypoint reference.
    pub entrypoint: String,

    /// Output bucket binding.
    #[serde(default)]
    pub bucket: String,

    /// Output dataset binding.
    #[serde(default)]
    pub dataset: String,

    /// Opaque service-specific parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response body for the task enqueue endpoint.
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    /// Assigned task id.
    pub task_id: String,
}

// ============================================================================
// Job report types
// ============================================================================

/// Request body for the remote-job report endpoint, posted by a worker's
/// execution path after it submits a remote job.
#[derive(Debug, Deserialize)]
pub struct ReportJobRequest {
    /// Task the job belongs to.
    pub task_id: String,

    /// Provider-assigned remote job id.
    pub job_id: String,
}

// ============================================================================
// Error types
// ============================================================================

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Inspection types
// ============================================================================

/// Response for a single active worker.
#[derive(Debug, Serialize)]
pub struct WorkerResponse {
    pub worker_id: String,
    pub task_id: String,
    pub region: String,
    pub status: String,
    pub created_at: String,
}

/// Response for a single job status record.
#[derive(Debug, Serialize)]
pub struct StatusRecordResponse {
    pub task_id: String,
    pub job_id: Option<String>,
    pub state: String,
    pub error: Option<String>,
    pub submitted_at: String,
    pub checked_at: Option<String>,
}
