//! Loop-level error type.

use thiserror::Error;

use crate::provision::ProvisionError;
use crate::queue::QueueError;
use crate::storage::StorageError;
use crate::store::StoreError;

/// Error surfaced by a loop invocation.
///
/// Loops only propagate failures that abort the whole run (queue or store
/// outage, inventory listing failure); per-item collaborator failures are
/// handled inline and retried by the next trigger.
#[derive(Debug, Error)]
pub enum LoopError {
    /// Job queue failure.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Status store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Worker inventory failure.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// Object storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
