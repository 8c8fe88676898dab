//! Durable job queue seam with lease-based delivery.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use datapump_core::{Task, TaskId};

use crate::clock::Clock;

/// Job queue errors.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Queue backend outage.
    #[error("Queue backend unavailable: {0}")]
    Unavailable(String),
}

/// Pull-based queue of pending tasks with lease/acknowledge semantics.
///
/// Delivery is at-least-once: a leased task that is never acknowledged
/// becomes leasable again once its lease expires, so consumers must be
/// idempotent keyed by task id.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Append a task to the queue.
    async fn enqueue(&self, task: Task) -> Result<(), QueueError>;

    /// Lease up to `max_items` tasks that are not currently leased (or whose
    /// lease expired), marking them leased for `lease_duration`. Returns an
    /// empty vec when nothing is leasable; never blocks.
    async fn lease(
        &self,
        max_items: usize,
        lease_duration: Duration,
    ) -> Result<Vec<Task>, QueueError>;

    /// Permanently remove a task. Acknowledging an unknown or already
    /// removed id is a no-op.
    async fn acknowledge(&self, task_id: &TaskId) -> Result<(), QueueError>;

    /// Push a leased task's expiry out by `lease_duration` from now.
    /// No-op for unknown or unleased ids.
    async fn extend_lease(
        &self,
        task_id: &TaskId,
        lease_duration: Duration,
    ) -> Result<(), QueueError>;

    /// Number of tasks currently in the queue, leased or not.
    async fn depth(&self) -> Result<usize, QueueError>;
}

struct Slot {
    task: Task,
    leased_until: Option<DateTime<Utc>>,
}

impl Slot {
    fn leasable(&self, now: DateTime<Utc>) -> bool {
        match self.leased_until {
            None => true,
            Some(until) => until <= now,
        }
    }
}

/// In-memory queue backed by an injected clock.
///
/// The reference implementation of the contract; suitable for tests and
/// single-process deployments.
pub struct InMemoryQueue {
    clock: Arc<dyn Clock>,
    slots: RwLock<Vec<Slot>>,
}

impl InMemoryQueue {
    /// Create a queue on the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl JobQueue for InMemoryQueue {
    async fn enqueue(&self, task: Task) -> Result<(), QueueError> {
        let mut slots = self.slots.write().await;
        slots.push(Slot {
            task,
            leased_until: None,
        });
        Ok(())
    }

    async fn lease(
        &self,
        max_items: usize,
        lease_duration: Duration,
    ) -> Result<Vec<Task>, QueueError> {
        let now = self.clock.now();
        let mut slots = self.slots.write().await;
        let mut leased = Vec::new();

        for slot in slots.iter_mut() {
            if leased.len() == max_items {
                break;
            }
            if slot.leasable(now) {
                slot.leased_until = Some(now + lease_duration);
                leased.push(slot.task.clone());
            }
        }
        Ok(leased)
    }

    async fn acknowledge(&self, task_id: &TaskId) -> Result<(), QueueError> {
        let mut slots = self.slots.write().await;
        slots.retain(|slot| slot.task.id != *task_id);
        Ok(())
    }

    async fn extend_lease(
        &self,
        task_id: &TaskId,
        lease_duration: Duration,
    ) -> Result<(), QueueError> {
        let now = self.clock.now();
        let mut slots = self.slots.write().await;
        if let Some(slot) = slots.iter_mut().find(|s| s.task.id == *task_id) {
            if slot.leased_until.is_some() {
                slot.leased_until = Some(now + lease_duration);
            }
        }
        Ok(())
    }

    async fn depth(&self) -> Result<usize, QueueError> {
        Ok(self.slots.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;

    fn task(id: &str) -> Task {
        Task::new("svc", "tasks-l1", "europe-west1", "run.sh").with_id(TaskId::new(id))
    }

    fn queue(clock: &FakeClock) -> InMemoryQueue {
        InMemoryQueue::new(Arc::new(clock.clone()))
    }

    #[tokio::test]
    async fn test_lease_is_exclusive_until_expiry() {
        let clock = FakeClock::new();
        let q = queue(&clock);
        q.enqueue(task("t1")).await.unwrap();

        let first = q.lease(10, Duration::minutes(10)).await.unwrap();
        assert_eq!(first.len(), 1);

        // A second overlapping lease sees nothing.
        let second = q.lease(10, Duration::minutes(10)).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_unacknowledged_task_reappears_after_expiry() {
        let clock = FakeClock::new();
        let q = queue(&clock);
        q.enqueue(task("t1")).await.unwrap();

        let first = q.lease(10, Duration::minutes(10)).await.unwrap();
        assert_eq!(first.len(), 1);

        clock.advance(Duration::minutes(11));
        let second = q.lease(10, Duration::minutes(10)).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, TaskId::new("t1"));
    }

    #[tokio::test]
    async fn test_acknowledge_removes_and_is_idempotent() {
        let clock = FakeClock::new();
        let q = queue(&clock);
        q.enqueue(task("t1")).await.unwrap();
        q.lease(10, Duration::minutes(10)).await.unwrap();

        q.acknowledge(&TaskId::new("t1")).await.unwrap();
        assert_eq!(q.depth().await.unwrap(), 0);

        // Second acknowledge is a no-op.
        q.acknowledge(&TaskId::new("t1")).await.unwrap();
        // So is acknowledging a task that never existed.
        q.acknowledge(&TaskId::new("ghost")).await.unwrap();

        clock.advance(Duration::hours(1));
        assert!(q.lease(10, Duration::minutes(10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lease_respects_batch_size_and_order() {
        let clock = FakeClock::new();
        let q = queue(&clock);
        for i in 0..5 {
            q.enqueue(task(&format!("t{i}"))).await.unwrap();
        }

        let batch = q.lease(3, Duration::minutes(10)).await.unwrap();
        let ids: Vec<_> = batch.iter().map(|t| t.id.as_str().to_owned()).collect();
        assert_eq!(ids, ["t0", "t1", "t2"]);

        let rest = q.lease(10, Duration::minutes(10)).await.unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[tokio::test]
    async fn test_extend_lease_defers_redelivery() {
        let clock = FakeClock::new();
        let q = queue(&clock);
        q.enqueue(task("t1")).await.unwrap();
        q.lease(1, Duration::minutes(10)).await.unwrap();

        clock.advance(Duration::minutes(8));
        q.extend_lease(&TaskId::new("t1"), Duration::minutes(10))
            .await
            .unwrap();

        // Original lease would have expired here; the extension holds.
        clock.advance(Duration::minutes(4));
        assert!(q.lease(1, Duration::minutes(10)).await.unwrap().is_empty());

        clock.advance(Duration::minutes(7));
        assert_eq!(q.lease(1, Duration::minutes(10)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_extend_lease_ignores_unleased_tasks() {
        let clock = FakeClock::new();
        let q = queue(&clock);
        q.enqueue(task("t1")).await.unwrap();

        q.extend_lease(&TaskId::new("t1"), Duration::minutes(10))
            .await
            .unwrap();

        // Still immediately leasable: extension never creates a lease.
        assert_eq!(q.lease(1, Duration::minutes(10)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_queue_lease_returns_empty() {
        let clock = FakeClock::new();
        let q = queue(&clock);
        assert!(q.lease(10, Duration::minutes(10)).await.unwrap().is_empty());
    }
}
