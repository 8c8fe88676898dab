//! Datapump task lifecycle orchestrator.
//!
//! The lifecycle core: trait seams for the durable job queue, status store,
//! worker provisioner, remote job service and object storage, plus the five
//! periodic loops that move tasks from "requested" to "done and cleaned up".
//!
//! Every loop is a short-lived, self-overlap-tolerant procedure over the
//! shared durable state; there is no long-lived scheduler in process. The
//! in-memory seam implementations back tests and single-process deployments.

pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod provision;
pub mod queue;
pub mod reaper;
pub mod remote;
pub mod status_checker;
pub mod storage;
pub mod store;
pub mod sweeper;
pub mod task_manager;

// Re-export commonly used types
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::OrchestratorConfig;
pub use error::LoopError;
pub use provision::{InMemoryProvisioner, ProvisionError, WorkerProvisioner};
pub use queue::{InMemoryQueue, JobQueue, QueueError};
pub use reaper::{ReaperReport, WorkerReaper};
pub use remote::{InMemoryRemoteJobs, RemoteJobError, RemoteJobService, RemoteJobStatus};
pub use status_checker::{StatusChecker, StatusCheckerReport};
pub use storage::{InMemoryObjectStore, ObjectStore, StorageError, StoredObject};
pub use store::{InMemoryStatusStore, StatusStore, StoreError};
pub use sweeper::{StatusSweepReport, StatusSweeper, StorageSweepReport, StorageSweeper};
pub use task_manager::{TaskManager, TaskManagerReport};
