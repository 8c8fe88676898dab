//! Task manager loop: drain the queue, provision one worker per task.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use datapump_core::JobStatusRecord;

use crate::clock::Clock;
use crate::config::OrchestratorConfig;
use crate::error::LoopError;
use crate::provision::{ProvisionError, WorkerProvisioner};
use crate::queue::JobQueue;
use crate::store::StatusStore;

/// Outcome counters for one task-manager run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TaskManagerReport {
    /// Tasks leased this run.
    pub leased: usize,
    /// Tasks acknowledged after a worker was provisioned (or found to
    /// already exist).
    pub provisioned: usize,
    /// Tasks left leased after a retryable provisioning failure; they
    /// reappear once the lease expires.
    pub deferred: usize,
    /// Malformed tasks acknowledged out of the queue and recorded as Error.
    pub rejected: usize,
}

/// The task manager: one run leases a batch of tasks and attempts to
/// provision a worker for each.
///
/// Overlapping runs are safe: the queue lease prevents double delivery, and
/// worker ids derive from task ids so a duplicate provisioning attempt
/// collides instead of creating a second worker.
pub struct TaskManager {
    queue: Arc<dyn JobQueue>,
    provisioner: Arc<dyn WorkerProvisioner>,
    store: Arc<dyn StatusStore>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
}

impl TaskManager {
    /// Create a task manager over the given seams.
    pub fn new(
        queue: Arc<dyn JobQueue>,
        provisioner: Arc<dyn WorkerProvisioner>,
        store: Arc<dyn StatusStore>,
        clock: Arc<dyn Clock>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            queue,
            provisioner,
            store,
            clock,
            config,
        }
    }

    /// Run one trigger invocation.
    pub async fn run_once(&self) -> Result<TaskManagerReport, LoopError> {
        let tasks = self
            .queue
            .lease(self.config.lease_batch_size, self.config.lease_duration())
            .await?;

        let mut report = TaskManagerReport {
            leased: tasks.len(),
            ..Default::default()
        };

        for task in tasks {
            match self.provisioner.create(&task).await {
                Ok(handle) => {
                    info!(
                        task_id = %task.id,
                        worker_id = %handle.id,
                        region = %handle.region,
                        service = %task.service,
                        "Worker provisioned, acknowledging task"
                    );
                    self.queue.acknowledge(&task.id).await?;
                    report.provisioned += 1;
                }
                Err(ProvisionError::AlreadyExists(worker_id)) => {
                    // An earlier run (overlap, or a crash between create and
                    // acknowledge) already owns this task.
                    info!(
                        task_id = %task.id,
                        worker_id = %worker_id,
                        "Worker already exists, acknowledging task"
                    );
                    self.queue.acknowledge(&task.id).await?;
                    report.provisioned += 1;
                }
                Err(err) if err.is_retryable() => {
                    warn!(
                        task_id = %task.id,
                        error = %err,
                        "Provisioning deferred, task retries after lease expiry"
                    );
                    report.deferred += 1;
                }
                Err(err) => {
                    warn!(
                        task_id = %task.id,
                        error = %err,
                        "Task rejected, recording failure"
                    );
                    self.store
                        .upsert(JobStatusRecord::rejected(
                            task.id.clone(),
                            err.to_string(),
                            self.clock.now(),
                        ))
                        .await?;
                    self.queue.acknowledge(&task.id).await?;
                    report.rejected += 1;
                }
            }
        }

        Ok(report)
    }
}
