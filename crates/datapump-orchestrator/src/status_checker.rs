//! Status checker loop: refresh non-terminal job records from the remote
//! job service.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use datapump_core::JobState;

use crate::clock::Clock;
use crate::config::OrchestratorConfig;
use crate::error::LoopError;
use crate::remote::RemoteJobService;
use crate::store::StatusStore;

/// Outcome counters for one status-checker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusCheckerReport {
    /// Non-terminal records scanned.
    pub scanned: usize,
    /// Records whose state advanced this run.
    pub updated: usize,
    /// Records absorbed to Error because the remote job was not found after
    /// the grace period.
    pub missing: usize,
}

/// The status checker: one run polls the remote service for every record
/// still Pending or Running.
///
/// Records are independent; a failure on one record (or an abandoned run)
/// leaves the rest for the next trigger.
pub struct StatusChecker {
    store: Arc<dyn StatusStore>,
    remote: Arc<dyn RemoteJobService>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
}

impl StatusChecker {
    /// Create a status checker over the given seams.
    pub fn new(
        store: Arc<dyn StatusStore>,
        remote: Arc<dyn RemoteJobService>,
        clock: Arc<dyn Clock>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            remote,
            clock,
            config,
        }
    }

    /// Run one trigger invocation.
    pub async fn run_once(&self) -> Result<StatusCheckerReport, LoopError> {
        let records = self.store.list_active().await?;
        let now = self.clock.now();

        let mut report = StatusCheckerReport {
            scanned: records.len(),
            ..Default::default()
        };

        for mut record in records {
            // Records without a remote job are terminal by construction and
            // never listed as active; guard anyway.
            let Some(job_id) = record.job_id.clone() else {
                continue;
            };

            match self.remote.get_status(&job_id).await {
                Ok(Some(status)) => {
                    let changed = record.observe(status.job_state(), status.error.clone(), now);
                    if changed {
                        info!(
                            task_id = %record.task_id,
                            job_id = %job_id,
                            state = ?record.state,
                            "Remote job state updated"
                        );
                        report.updated += 1;
                    }
                    self.store.upsert(record).await?;
                }
                Ok(None) => {
                    let age = now.signed_duration_since(record.submitted_at);
                    if age > self.config.job_not_found_grace() {
                        warn!(
                            task_id = %record.task_id,
                            job_id = %job_id,
                            "Remote job not found after grace period, marking Error"
                        );
                        record.observe(JobState::Error, Some("job not found".to_string()), now);
                        self.store.upsert(record).await?;
                        report.missing += 1;
                    }
                    // Within grace: likely a submission race, check again
                    // next cycle.
                }
                Err(err) => {
                    warn!(
                        task_id = %record.task_id,
                        job_id = %job_id,
                        error = %err,
                        "Remote status query failed, retrying next cycle"
                    );
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::remote::{InMemoryRemoteJobs, RemoteJobStatus};
    use crate::store::InMemoryStatusStore;
    use chrono::Duration;
    use datapump_core::{JobId, JobStatusRecord, TaskId};

    struct Harness {
        clock: FakeClock,
        store: Arc<InMemoryStatusStore>,
        remote: Arc<InMemoryRemoteJobs>,
        checker: StatusChecker,
    }

    fn harness() -> Harness {
        let clock = FakeClock::new();
        let store = Arc::new(InMemoryStatusStore::new());
        let remote = Arc::new(InMemoryRemoteJobs::new());
        let checker = StatusChecker::new(
            store.clone(),
            remote.clone(),
            Arc::new(clock.clone()),
            OrchestratorConfig::default(),
        );
        Harness {
            clock,
            store,
            remote,
            checker,
        }
    }

    async fn seed(h: &Harness, task: &str, job: &str, status: RemoteJobStatus) {
        h.remote.set_status(JobId::new(job), status).await;
        h.store
            .upsert(JobStatusRecord::new(
                TaskId::new(task),
                JobId::new(job),
                h.clock.now(),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pending_to_running_to_done_across_cycles() {
        // Scenario: record Pending -> remote reports RUNNING -> Running ->
        // next cycle remote reports DONE -> Done (absorbing).
        let h = harness();
        seed(&h, "t1", "j1", RemoteJobStatus::running()).await;

        let report = h.checker.run_once().await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.updated, 1);
        let rec = h.store.get(&TaskId::new("t1")).await.unwrap().unwrap();
        assert_eq!(rec.state, JobState::Running);

        h.remote
            .set_status(JobId::new("j1"), RemoteJobStatus::done())
            .await;
        h.checker.run_once().await.unwrap();
        let rec = h.store.get(&TaskId::new("t1")).await.unwrap().unwrap();
        assert_eq!(rec.state, JobState::Done);

        // Terminal records are no longer scanned.
        let report = h.checker.run_once().await.unwrap();
        assert_eq!(report.scanned, 0);
    }

    #[tokio::test]
    async fn test_provider_error_detail_is_persisted() {
        let h = harness();
        seed(&h, "t1", "j1", RemoteJobStatus::failed("access denied")).await;

        h.checker.run_once().await.unwrap();
        let rec = h.store.get(&TaskId::new("t1")).await.unwrap().unwrap();
        assert_eq!(rec.state, JobState::Error);
        assert_eq!(rec.error.as_deref(), Some("access denied"));
    }

    #[tokio::test]
    async fn test_not_found_within_grace_is_left_pending() {
        let h = harness();
        // Record exists, remote has no such job.
        h.store
            .upsert(JobStatusRecord::new(
                TaskId::new("t1"),
                JobId::new("j-missing"),
                h.clock.now(),
            ))
            .await
            .unwrap();

        let report = h.checker.run_once().await.unwrap();
        assert_eq!(report.missing, 0);
        let rec = h.store.get(&TaskId::new("t1")).await.unwrap().unwrap();
        assert_eq!(rec.state, JobState::Pending);
    }

    #[tokio::test]
    async fn test_not_found_past_grace_becomes_error() {
        let h = harness();
        h.store
            .upsert(JobStatusRecord::new(
                TaskId::new("t1"),
                JobId::new("j-missing"),
                h.clock.now(),
            ))
            .await
            .unwrap();

        h.clock.advance(Duration::minutes(11));
        let report = h.checker.run_once().await.unwrap();
        assert_eq!(report.missing, 1);

        let rec = h.store.get(&TaskId::new("t1")).await.unwrap().unwrap();
        assert_eq!(rec.state, JobState::Error);
        assert_eq!(rec.error.as_deref(), Some("job not found"));
    }

    #[tokio::test]
    async fn test_partial_progress_across_records() {
        let h = harness();
        seed(&h, "t1", "j1", RemoteJobStatus::done()).await;
        seed(&h, "t2", "j2", RemoteJobStatus::pending()).await;

        let report = h.checker.run_once().await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.updated, 1);

        assert_eq!(
            h.store
                .get(&TaskId::new("t1"))
                .await
                .unwrap()
                .unwrap()
                .state,
            JobState::Done
        );
        assert_eq!(
            h.store
                .get(&TaskId::new("t2"))
                .await
                .unwrap()
                .unwrap()
                .state,
            JobState::Pending
        );
    }
}
