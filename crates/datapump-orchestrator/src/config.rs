//! Orchestrator configuration.

use chrono::Duration;

/// Operational thresholds for the lifecycle loops.
///
/// These are deployment-tuned knobs, not semantics: every loop reads them
/// through this struct and nothing else hard-codes a duration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of tasks leased per task-manager run.
    pub lease_batch_size: usize,

    /// How long a leased task stays invisible to other consumers (seconds).
    /// Must comfortably cover one provisioning attempt.
    pub lease_duration_secs: u64,

    /// Maximum concurrent workers per region (provider quota).
    pub max_workers_per_region: usize,

    /// Minimum worker age before the reaper will consider it at all
    /// (seconds). Covers instance boot plus first status report.
    pub min_worker_age_secs: u64,

    /// Age past which a worker with no terminal signal is flagged for
    /// operator attention (seconds). Flagged, never auto-deleted.
    pub stuck_worker_age_secs: u64,

    /// Grace period before a remote job missing at the provider is
    /// absorbed to Error (seconds). Covers submission races.
    pub job_not_found_grace_secs: u64,
}

impl OrchestratorConfig {
    /// Lease duration as a chrono duration.
    pub fn lease_duration(&self) -> Duration {
        Duration::seconds(self.lease_duration_secs as i64)
    }

    /// Minimum reapable worker age as a chrono duration.
    pub fn min_worker_age(&self) -> Duration {
        Duration::seconds(self.min_worker_age_secs as i64)
    }

    /// Stuck-worker threshold as a chrono duration.
    pub fn stuck_worker_age(&self) -> Duration {
        Duration::seconds(self.stuck_worker_age_secs as i64)
    }

    /// Job not-found grace period as a chrono duration.
    pub fn job_not_found_grace(&self) -> Duration {
        Duration::seconds(self.job_not_found_grace_secs as i64)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            lease_batch_size: 10,
            lease_duration_secs: 600,
            max_workers_per_region: 8,
            min_worker_age_secs: 180,
            stuck_worker_age_secs: 1800,
            job_not_found_grace_secs: 600,
        }
    }
}
