//! Status enums for Workers and remote Jobs.

use serde::{Deserialize, Serialize};

/// Status of an ephemeral worker instance.
///
/// Terminal statuses are observed, never set by the orchestrator: a worker
/// marks itself completed (or the provider reports failure), and the reaper
/// reacts to what it sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    /// Creation request accepted, instance booting.
    #[default]
    Provisioning,
    /// Instance up and executing its task.
    Running,
    /// Instance finished its task and reported completion.
    Completed,
    /// Instance failed (provider-reported or self-reported).
    Failed,
}

impl WorkerStatus {
    /// Returns true if the worker is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Status of a remote (data-warehouse) job tracked by the status checker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Job submitted but not yet picked up by the remote service.
    #[default]
    Pending,
    /// Job actively executing remotely.
    Running,
    /// Job completed successfully.
    Done,
    /// Job failed, or was never found at the remote service.
    Error,
}

impl JobState {
    /// Returns true if the state is terminal (Done and Error are absorbing).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Returns true if the job is still in flight (not terminal).
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Monotonic ordering rank: Pending < Running < {Done, Error}.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Running => 1,
            Self::Done | Self::Error => 2,
        }
    }
}
