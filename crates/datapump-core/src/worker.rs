//! Worker handle type.

use crate::{TaskId, WorkerId, WorkerStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Handle to an ephemeral compute worker owned by the orchestrator.
///
/// A worker executes exactly one task; its id is derived from the task id,
/// so there is at most one live handle per task at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerHandle {
    /// Unique worker identifier, derived from the task id.
    pub id: WorkerId,

    /// Task this worker was provisioned for.
    pub task_id: TaskId,

    /// Region the worker runs in.
    pub region: String,

    /// Last observed worker status.
    pub status: WorkerStatus,

    /// When the creation request was accepted.
    pub created_at: DateTime<Utc>,
}

impl WorkerHandle {
    /// Create a handle for a freshly requested worker.
    pub fn new(task_id: TaskId, region: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: WorkerId::for_task(&task_id),
            task_id,
            region: region.into(),
            status: WorkerStatus::Provisioning,
            created_at,
        }
    }

    /// Time elapsed since the worker was requested.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }

    /// Whether the worker itself reports a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
