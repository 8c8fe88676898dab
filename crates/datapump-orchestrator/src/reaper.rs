//! Worker reaper loop: delete workers whose task has finished.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::OrchestratorConfig;
use crate::error::LoopError;
use crate::provision::WorkerProvisioner;
use crate::store::StatusStore;

/// Outcome counters for one reaper run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReaperReport {
    /// Workers listed this run.
    pub scanned: usize,
    /// Workers deleted.
    pub reaped: usize,
    /// Workers past the stuck threshold with no terminal signal; flagged
    /// for operator attention, never auto-deleted.
    pub stuck: usize,
}

/// The worker reaper: one run lists active workers and deletes those whose
/// task reached a terminal state.
///
/// The terminal signal is the task's status record when one exists, and the
/// worker's own reported status otherwise. Workers younger than the minimum
/// age are never touched; a worker may complete between list and delete,
/// which the provisioner's idempotent delete absorbs.
pub struct WorkerReaper {
    provisioner: Arc<dyn WorkerProvisioner>,
    store: Arc<dyn StatusStore>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
}

impl WorkerReaper {
    /// Create a reaper over the given seams.
    pub fn new(
        provisioner: Arc<dyn WorkerProvisioner>,
        store: Arc<dyn StatusStore>,
        clock: Arc<dyn Clock>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provisioner,
            store,
            clock,
            config,
        }
    }

    /// Run one trigger invocation.
    pub async fn run_once(&self) -> Result<ReaperReport, LoopError> {
        let workers = self.provisioner.list_active().await?;
        let now = self.clock.now();

        let mut report = ReaperReport {
            scanned: workers.len(),
            ..Default::default()
        };

        for worker in workers {
            let age = worker.age(now);
            if age < self.config.min_worker_age() {
                continue;
            }

            let terminal = match self.store.get(&worker.task_id).await? {
                Some(record) => record.is_terminal(),
                None => worker.is_terminal(),
            };

            if terminal {
                match self.provisioner.delete(&worker.id).await {
                    Ok(()) => {
                        info!(
                            worker_id = %worker.id,
                            task_id = %worker.task_id,
                            region = %worker.region,
                            "Worker reaped"
                        );
                        report.reaped += 1;
                    }
                    Err(err) => {
                        warn!(
                            worker_id = %worker.id,
                            error = %err,
                            "Worker delete failed, retrying next cycle"
                        );
                    }
                }
            } else if age > self.config.stuck_worker_age() {
                warn!(
                    worker_id = %worker.id,
                    task_id = %worker.task_id,
                    age_secs = age.num_seconds(),
                    "Worker past stuck threshold, needs operator attention"
                );
                report.stuck += 1;
            }
        }

        Ok(report)
    }
}
