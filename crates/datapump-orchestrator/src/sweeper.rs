//! Retention sweepers: status store reset and bucket object expiry.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use datapump_core::RetentionPolicy;

use crate::clock::Clock;
use crate::error::LoopError;
use crate::storage::ObjectStore;
use crate::store::StatusStore;

/// Outcome counters for one status-store sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusSweepReport {
    /// Records deleted.
    pub deleted: usize,
}

/// Daily full reset of the status store.
///
/// Deletes every record unconditionally; the trigger must be scheduled
/// outside the windows when task batches are in flight.
pub struct StatusSweeper {
    store: Arc<dyn StatusStore>,
}

impl StatusSweeper {
    /// Create a sweeper over the given store.
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    /// Run one trigger invocation.
    pub async fn run_once(&self) -> Result<StatusSweepReport, LoopError> {
        let deleted = self.store.clear().await?;
        info!(deleted, "Status store swept");
        Ok(StatusSweepReport { deleted })
    }
}

/// Outcome counters for one storage sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StorageSweepReport {
    /// Objects examined across all configured buckets.
    pub scanned: usize,
    /// Expired objects deleted.
    pub deleted: usize,
    /// Deletions that failed; left for the next run.
    pub failed: usize,
}

/// Daily bucket cleanup driven by per-bucket retention policies.
///
/// Objects older than a bucket's look-back window are deleted; everything
/// about a partial run (listing failure, per-object delete failure) is safe
/// to leave for the next trigger.
pub struct StorageSweeper {
    objects: Arc<dyn ObjectStore>,
    policies: Vec<RetentionPolicy>,
    clock: Arc<dyn Clock>,
}

impl StorageSweeper {
    /// Create a sweeper over the given store and policies.
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        policies: Vec<RetentionPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            objects,
            policies,
            clock,
        }
    }

    /// Run one trigger invocation.
    pub async fn run_once(&self) -> Result<StorageSweepReport, LoopError> {
        let now = self.clock.now();
        let mut report = StorageSweepReport::default();

        for policy in &self.policies {
            let objects = match self.objects.list_objects(&policy.bucket).await {
                Ok(objects) => objects,
                Err(err) => {
                    warn!(
                        bucket = %policy.bucket,
                        error = %err,
                        "Bucket listing failed, skipping this run"
                    );
                    continue;
                }
            };

            for object in objects {
                report.scanned += 1;
                if !policy.is_expired(object.created_at, now) {
                    continue;
                }
                match self
                    .objects
                    .delete_object(&policy.bucket, &object.name)
                    .await
                {
                    Ok(()) => {
                        info!(
                            bucket = %policy.bucket,
                            object = %object.name,
                            "Expired object deleted"
                        );
                        report.deleted += 1;
                    }
                    Err(err) => {
                        warn!(
                            bucket = %policy.bucket,
                            object = %object.name,
                            error = %err,
                            "Object delete failed, left for next run"
                        );
                        report.failed += 1;
                    }
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
    use crate::storage::InMemoryObjectStore;
    use crate::store::InMemoryStatusStore;
    use chrono::{Duration, Utc};
    use datapump_core::{JobId, JobStatusRecord, TaskId};

    #[tokio::test]
    async fn test_status_sweep_is_full_reset_and_idempotent() {
        let store = Arc::new(InMemoryStatusStore::new());
        store
            .upsert(JobStatusRecord::new(
                TaskId::new("t1"),
                JobId::new("j1"),
                Utc::now(),
            ))
            .await
            .unwrap();
        store
            .upsert(JobStatusRecord::rejected(
                TaskId::new("t2"),
                "bad",
                Utc::now(),
            ))
            .await
            .unwrap();

        let sweeper = StatusSweeper::new(store.clone());
        assert_eq!(sweeper.run_once().await.unwrap().deleted, 2);
        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(sweeper.run_once().await.unwrap().deleted, 0);
    }

    #[tokio::test]
    async fn test_storage_sweep_deletes_only_expired() {
        // Scenario: 7-day window; O is 8 days old, P is 3 days old ->
        // only O is deleted.
        let clock = FakeClock::new();
        let now = clock.now();
        let objects = Arc::new(InMemoryObjectStore::new());
        objects.put_object("b", "o", now - Duration::days(8)).await;
        objects.put_object("b", "p", now - Duration::days(3)).await;

        let sweeper = StorageSweeper::new(
            objects.clone(),
            vec![RetentionPolicy::new("b", 7)],
            Arc::new(clock.clone()),
        );

        let report = sweeper.run_once().await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.deleted, 1);

        let remaining = objects.list_objects("b").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "p");

        // Re-running on a clean bucket deletes nothing.
        let report = sweeper.run_once().await.unwrap();
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_storage_sweep_honors_per_bucket_windows() {
        let clock = FakeClock::new();
        let now = clock.now();
        let objects = Arc::new(InMemoryObjectStore::new());
        objects
            .put_object("short", "x", now - Duration::days(2))
            .await;
        objects
            .put_object("long", "y", now - Duration::days(2))
            .await;

        let sweeper = StorageSweeper::new(
            objects.clone(),
            vec![
                RetentionPolicy::new("short", 1),
                RetentionPolicy::new("long", 30),
            ],
            Arc::new(clock.clone()),
        );

        let report = sweeper.run_once().await.unwrap();
        assert_eq!(report.deleted, 1);
        assert!(objects.list_objects("short").await.unwrap().is_empty());
        assert_eq!(objects.list_objects("long").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_buckets_untouched() {
        let clock = FakeClock::new();
        let now = clock.now();
        let objects = Arc::new(InMemoryObjectStore::new());
        objects
            .put_object("other", "old", now - Duration::days(100))
            .await;

        let sweeper = StorageSweeper::new(objects.clone(), Vec::new(), Arc::new(clock.clone()));
        let report = sweeper.run_once().await.unwrap();
        assert_eq!(report.scanned, 0);
        assert_eq!(objects.list_objects("other").await.unwrap().len(), 1);
    }
}
