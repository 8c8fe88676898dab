//! Durable status store seam.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use datapump_core::{JobStatusRecord, TaskId};

/// Status store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store backend outage.
    #[error("Status store unavailable: {0}")]
    Unavailable(String),
}

/// Durable record store keyed by task id.
///
/// All writes are last-write-wins on a single record; the per-record
/// monotonicity lives in `JobStatusRecord::observe`, not here.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Insert or replace a record.
    async fn upsert(&self, record: JobStatusRecord) -> Result<(), StoreError>;

    /// Fetch one record.
    async fn get(&self, task_id: &TaskId) -> Result<Option<JobStatusRecord>, StoreError>;

    /// All records with a non-terminal state (Pending or Running).
    async fn list_active(&self) -> Result<Vec<JobStatusRecord>, StoreError>;

    /// Every record in the store.
    async fn list_all(&self) -> Result<Vec<JobStatusRecord>, StoreError>;

    /// Remove one record. Unknown ids are a no-op.
    async fn delete(&self, task_id: &TaskId) -> Result<(), StoreError>;

    /// Remove every record, returning how many were deleted.
    async fn clear(&self) -> Result<usize, StoreError>;
}

/// In-memory status store.
#[derive(Default)]
pub struct InMemoryStatusStore {
    records: RwLock<HashMap<TaskId, JobStatusRecord>>,
}

impl InMemoryStatusStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn upsert(&self, record: JobStatusRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.insert(record.task_id.clone(), record);
        Ok(())
    }

    async fn get(&self, task_id: &TaskId) -> Result<Option<JobStatusRecord>, StoreError> {
        Ok(self.records.read().await.get(task_id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<JobStatusRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.state.is_active())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<JobStatusRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn delete(&self, task_id: &TaskId) -> Result<(), StoreError> {
        self.records.write().await.remove(task_id);
        Ok(())
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let deleted = records.len();
        records.clear();
        Ok(deleted)
    }
}
