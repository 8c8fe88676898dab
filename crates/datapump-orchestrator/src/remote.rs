//! Remote job service seam.
//!
//! The execution path (out of scope here) submits asynchronous jobs to an
//! external data-processing service; the status checker polls them to
//! completion through this seam.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use datapump_core::{JobId, JobState};

/// Remote job service errors.
#[derive(Debug, Error)]
pub enum RemoteJobError {
    /// Service outage or timeout.
    #[error("Remote job service unavailable: {0}")]
    Unavailable(String),
}

/// Provider-reported job status.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteJobStatus {
    /// Provider state string (e.g. "PENDING", "RUNNING", "DONE").
    pub state: String,

    /// Provider error detail, present when the job failed.
    pub error: Option<String>,
}

impl RemoteJobStatus {
    /// A job the provider reports as queued.
    pub fn pending() -> Self {
        Self {
            state: "PENDING".to_string(),
            error: None,
        }
    }

    /// A job the provider reports as executing.
    pub fn running() -> Self {
        Self {
            state: "RUNNING".to_string(),
            error: None,
        }
    }

    /// A successfully completed job.
    pub fn done() -> Self {
        Self {
            state: "DONE".to_string(),
            error: None,
        }
    }

    /// A failed job with the provider's error detail.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            state: "DONE".to_string(),
            error: Some(error.into()),
        }
    }

    /// Map the provider's report onto the domain job state.
    ///
    /// An error detail wins over the state string (providers report failed
    /// jobs as DONE-with-errorResult). Unknown states map to Running: the
    /// job exists and is not terminal, so keep polling.
    pub fn job_state(&self) -> JobState {
        if self.error.is_some() {
            return JobState::Error;
        }
        match self.state.to_ascii_uppercase().as_str() {
            "PENDING" => JobState::Pending,
            "RUNNING" => JobState::Running,
            "DONE" | "SUCCESS" => JobState::Done,
            "ERROR" | "FAILED" => JobState::Error,
            _ => JobState::Running,
        }
    }
}

/// Asynchronous job service: submit a job spec, poll its status.
#[async_trait]
pub trait RemoteJobService: Send + Sync {
    /// Submit a job, returning the provider-assigned id.
    async fn submit(&self, spec: serde_json::Value) -> Result<JobId, RemoteJobError>;

    /// Current status of a job, or `None` if the provider has no job with
    /// this id (possibly a submission race; the checker applies a grace
    /// period before treating it as terminal).
    async fn get_status(&self, job_id: &JobId) -> Result<Option<RemoteJobStatus>, RemoteJobError>;
}

/// In-memory remote job service.
#[derive(Default)]
pub struct InMemoryRemoteJobs {
    jobs: RwLock<HashMap<JobId, RemoteJobStatus>>,
}

impl InMemoryRemoteJobs {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a job's provider-reported status.
    pub async fn set_status(&self, job_id: JobId, status: RemoteJobStatus) {
        self.jobs.write().await.insert(job_id, status);
    }
}

#[async_trait]
impl RemoteJobService for InMemoryRemoteJobs {
    async fn submit(&self, _spec: serde_json::Value) -> Result<JobId, RemoteJobError> {
        let job_id = JobId::generate();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), RemoteJobStatus::pending());
        Ok(job_id)
    }

    async fn get_status(&self, job_id: &JobId) -> Result<Option<RemoteJobStatus>, RemoteJobError> {
        Ok(self.jobs.read().await.get(job_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        assert_eq!(RemoteJobStatus::pending().job_state(), JobState::Pending);
        assert_eq!(RemoteJobStatus::running().job_state(), JobState::Running);
        assert_eq!(RemoteJobStatus::done().job_state(), JobState::Done);
        assert_eq!(
            RemoteJobStatus::failed("bad query").job_state(),
            JobState::Error
        );
    }

    #[test]
    fn test_error_detail_wins_over_state_string() {
        let status = RemoteJobStatus {
            state: "RUNNING".to_string(),
            error: Some("canceled".to_string()),
        };
        assert_eq!(status.job_state(), JobState::Error);
    }

    #[test]
    fn test_unknown_state_stays_active() {
        let status = RemoteJobStatus {
            state: "MIGRATING".to_string(),
            error: None,
        };
        assert_eq!(status.job_state(), JobState::Running);
    }

    #[tokio::test]
    async fn test_submit_then_poll() {
        let svc = InMemoryRemoteJobs::new();
        let job_id = svc.submit(serde_json::json!({"query": "q"})).await.unwrap();

        let status = svc.get_status(&job_id).await.unwrap().unwrap();
        assert_eq!(status.job_state(), JobState::Pending);

        assert!(svc
            .get_status(&JobId::new("missing"))
            .await
            .unwrap()
            .is_none());
    }
}
