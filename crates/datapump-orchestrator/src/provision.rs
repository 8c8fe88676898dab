//! Ephemeral worker provisioner seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use datapump_core::{Task, WorkerHandle, WorkerId, WorkerStatus};

use crate::clock::Clock;

/// Provisioning errors.
///
/// The task manager branches on retryability: quota and backend outages
/// resolve themselves and are retried at the next trigger; malformed tasks
/// never will and must leave the queue.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A worker with this id already exists. Duplicate create attempts for
    /// the same task land here because worker ids derive from task ids.
    #[error("Worker already exists: {0}")]
    AlreadyExists(WorkerId),

    /// Region is at its concurrent-worker quota.
    #[error("Region {region} at worker quota ({quota})")]
    QuotaExceeded { region: String, quota: usize },

    /// Provisioning backend outage or timeout.
    #[error("Provisioning backend unavailable: {0}")]
    Unavailable(String),

    /// Task parameters cannot produce a valid worker (missing entrypoint,
    /// undecodable payload, unknown region).
    #[error("Invalid task parameters: {0}")]
    InvalidParams(String),
}

impl ProvisionError {
    /// Whether the next trigger should retry the same task.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. } | Self::Unavailable(_))
    }
}

/// Creates and destroys ephemeral compute workers.
#[async_trait]
pub trait WorkerProvisioner: Send + Sync {
    /// Request a worker for `task` in `task.region`, passing the encoded
    /// task payload and entrypoint as boot metadata. Returns as soon as the
    /// creation request is accepted; the worker runs the task on its own.
    async fn create(&self, task: &Task) -> Result<WorkerHandle, ProvisionError>;

    /// All workers currently known to the provider.
    async fn list_active(&self) -> Result<Vec<WorkerHandle>, ProvisionError>;

    /// Delete a worker. Deleting an already-deleted worker is a no-op.
    async fn delete(&self, worker_id: &WorkerId) -> Result<(), ProvisionError>;
}

/// In-memory provisioner with per-region quota enforcement.
///
/// Stands in for the compute provider in tests and single-process
/// deployments. `mark_status` plays the role of the worker's own completion
/// signal; `fail_next_create` injects transient provider failures.
pub struct InMemoryProvisioner {
    clock: Arc<dyn Clock>,
    quota_per_region: usize,
    workers: RwLock<HashMap<WorkerId, WorkerHandle>>,
    boot_metadata: RwLock<HashMap<WorkerId, String>>,
    fail_next: RwLock<Option<ProvisionError>>,
}

impl InMemoryProvisioner {
    /// Create a provisioner with the given per-region quota.
    pub fn new(clock: Arc<dyn Clock>, quota_per_region: usize) -> Self {
        Self {
            clock,
            quota_per_region,
            workers: RwLock::new(HashMap::new()),
            boot_metadata: RwLock::new(HashMap::new()),
            fail_next: RwLock::new(None),
        }
    }

    /// Make the next `create` call fail with `err`.
    pub async fn fail_next_create(&self, err: ProvisionError) {
        *self.fail_next.write().await = Some(err);
    }

    /// Record a worker- or provider-reported status change.
    pub async fn mark_status(&self, worker_id: &WorkerId, status: WorkerStatus) {
        if let Some(worker) = self.workers.write().await.get_mut(worker_id) {
            worker.status = status;
        }
    }

    /// The boot payload a worker was started with, if it exists.
    pub async fn boot_payload(&self, worker_id: &WorkerId) -> Option<String> {
        self.boot_metadata.read().await.get(worker_id).cloned()
    }

    fn validate(task: &Task) -> Result<(), ProvisionError> {
        if task.entrypoint.trim().is_empty() {
            return Err(ProvisionError::InvalidParams(
                "empty entrypoint reference".to_string(),
            ));
        }
        if task.region.trim().is_empty() {
            return Err(ProvisionError::InvalidParams("empty region".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkerProvisioner for InMemoryProvisioner {
    async fn create(&self, task: &Task) -> Result<WorkerHandle, ProvisionError> {
        if let Some(err) = self.fail_next.write().await.take() {
            return Err(err);
        }

        Self::validate(task)?;
        let payload = task
            .encode_payload()
            .map_err(|e| ProvisionError::InvalidParams(e.to_string()))?;

        let worker_id = WorkerId::for_task(&task.id);
        let mut workers = self.workers.write().await;

        if workers.contains_key(&worker_id) {
            return Err(ProvisionError::AlreadyExists(worker_id));
        }

        let in_region = workers
            .values()
            .filter(|w| w.region == task.region)
            .count();
        if in_region >= self.quota_per_region {
            return Err(ProvisionError::QuotaExceeded {
                region: task.region.clone(),
                quota: self.quota_per_region,
            });
        }

        let handle = WorkerHandle::new(task.id.clone(), &task.region, self.clock.now());
        workers.insert(worker_id.clone(), handle.clone());
        self.boot_metadata.write().await.insert(worker_id, payload);
        Ok(handle)
    }

    async fn list_active(&self) -> Result<Vec<WorkerHandle>, ProvisionError> {
        Ok(self.workers.read().await.values().cloned().collect())
    }

    async fn delete(&self, worker_id: &WorkerId) -> Result<(), ProvisionError> {
        self.workers.write().await.remove(worker_id);
        self.boot_metadata.write().await.remove(worker_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use datapump_core::TaskId;

    fn task(id: &str, region: &str) -> Task {
        Task::new("svc", "tasks-l1", region, "run.sh").with_id(TaskId::new(id))
    }

    fn provisioner(quota: usize) -> InMemoryProvisioner {
        InMemoryProvisioner::new(Arc::new(FakeClock::new()), quota)
    }

    #[tokio::test]
    async fn test_create_stores_boot_payload() {
        let p = provisioner(8);
        let t = task("t1", "europe-west1");
        let handle = p.create(&t).await.unwrap();

        assert_eq!(handle.status, WorkerStatus::Provisioning);
        let payload = p.boot_payload(&handle.id).await.unwrap();
        assert_eq!(Task::decode_payload(&payload).unwrap(), t);
    }

    #[tokio::test]
    async fn test_duplicate_create_fails_with_already_exists() {
        let p = provisioner(8);
        let t = task("t1", "europe-west1");
        p.create(&t).await.unwrap();

        match p.create(&t).await {
            Err(ProvisionError::AlreadyExists(id)) => {
                assert_eq!(id, WorkerId::for_task(&t.id));
            }
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quota_is_per_region() {
        let p = provisioner(1);
        p.create(&task("t1", "europe-west1")).await.unwrap();

        let err = p.create(&task("t2", "europe-west1")).await.unwrap_err();
        assert!(matches!(err, ProvisionError::QuotaExceeded { .. }));
        assert!(err.is_retryable());

        // A different region has its own quota.
        p.create(&task("t3", "europe-west2")).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_params_not_retryable() {
        let p = provisioner(8);
        let err = p.create(&task("t1", "")).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidParams(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let p = provisioner(8);
        let handle = p.create(&task("t1", "europe-west1")).await.unwrap();

        p.delete(&handle.id).await.unwrap();
        p.delete(&handle.id).await.unwrap();
        assert!(p.list_active().await.unwrap().is_empty());
    }
}
