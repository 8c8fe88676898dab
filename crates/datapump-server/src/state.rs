//! Shared application state.

use std::sync::Arc;

use datapump_core::RetentionPolicy;
use datapump_orchestrator::{
    Clock, InMemoryObjectStore, InMemoryProvisioner, InMemoryQueue, InMemoryRemoteJobs,
    InMemoryStatusStore, JobQueue, ObjectStore, OrchestratorConfig, RemoteJobService, StatusChecker,
    StatusStore, StatusSweeper, StorageSweeper, SystemClock, TaskManager, WorkerProvisioner,
    WorkerReaper,
};

/// Shared application state: the collaborator seams every trigger
/// invocation runs over.
pub struct AppState {
    /// Durable job queue.
    pub queue: Arc<dyn JobQueue>,

    /// Durable job status store.
    pub store: Arc<dyn StatusStore>,

    /// Ephemeral worker provisioner.
    pub provisioner: Arc<dyn WorkerProvisioner>,

    /// Remote job service polled by the status checker.
    pub remote: Arc<dyn RemoteJobService>,

    /// Object storage swept by the retention sweeper.
    pub objects: Arc<dyn ObjectStore>,

    /// Operator-managed retention policies.
    pub policies: Vec<RetentionPolicy>,

    /// Time source shared with the loops.
    pub clock: Arc<dyn Clock>,

    /// Lifecycle thresholds.
    pub config: OrchestratorConfig,
}

impl AppState {
    /// Create state over the in-memory reference backends.
    pub fn in_memory(config: OrchestratorConfig, policies: Vec<RetentionPolicy>) -> Arc<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Arc::new(Self {
            queue: Arc::new(InMemoryQueue::new(clock.clone())),
            store: Arc::new(InMemoryStatusStore::new()),
            provisioner: Arc::new(InMemoryProvisioner::new(
                clock.clone(),
                config.max_workers_per_region,
            )),
            remote: Arc::new(InMemoryRemoteJobs::new()),
            objects: Arc::new(InMemoryObjectStore::new()),
            policies,
            clock,
            config,
        })
    }

    /// Task manager over this state.
    pub fn task_manager(&self) -> TaskManager {
        TaskManager::new(
            self.queue.clone(),
            self.provisioner.clone(),
            self.store.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    /// Status checker over this state.
    pub fn status_checker(&self) -> StatusChecker {
        StatusChecker::new(
            self.store.clone(),
            self.remote.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    /// Worker reaper over this state.
    pub fn worker_reaper(&self) -> WorkerReaper {
        WorkerReaper::new(
            self.provisioner.clone(),
            self.store.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    /// Status store sweeper over this state.
    pub fn status_sweeper(&self) -> StatusSweeper {
        StatusSweeper::new(self.store.clone())
    }

    /// Storage sweeper over this state.
    pub fn storage_sweeper(&self) -> StorageSweeper {
        StorageSweeper::new(
            self.objects.clone(),
            self.policies.clone(),
            self.clock.clone(),
        )
    }
}
