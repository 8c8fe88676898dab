//! Server configuration.

use datapump_core::RetentionPolicy;
use datapump_orchestrator::OrchestratorConfig;

/// Server configuration, assembled from environment variables.
pub struct ServerConfig {
    /// HTTP bind address.
    pub http_addr: String,

    /// Path to the operator-managed retention policy JSON file
    /// (a list of `{ "bucket": ..., "lookback_days": ... }` entries).
    pub retention_file: Option<String>,

    /// Lifecycle loop thresholds.
    pub orchestrator: OrchestratorConfig,
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = OrchestratorConfig::default();

        Ok(Self {
            http_addr: env_string("DATAPUMP_HTTP_ADDR", "0.0.0.0:8080"),
            retention_file: std::env::var("DATAPUMP_RETENTION_FILE").ok(),
            orchestrator: OrchestratorConfig {
                lease_batch_size: env_parse("DATAPUMP_LEASE_BATCH", defaults.lease_batch_size)?,
                lease_duration_secs: env_parse(
                    "DATAPUMP_LEASE_SECS",
                    defaults.lease_duration_secs,
                )?,
                max_workers_per_region: env_parse(
                    "DATAPUMP_REGION_QUOTA",
                    defaults.max_workers_per_region,
                )?,
                min_worker_age_secs: env_parse(
                    "DATAPUMP_MIN_WORKER_AGE_SECS",
                    defaults.min_worker_age_secs,
                )?,
                stuck_worker_age_secs: env_parse(
                    "DATAPUMP_STUCK_WORKER_AGE_SECS",
                    defaults.stuck_worker_age_secs,
                )?,
                job_not_found_grace_secs: env_parse(
                    "DATAPUMP_JOB_GRACE_SECS",
                    defaults.job_not_found_grace_secs,
                )?,
            },
        })
    }

    /// Load retention policies from the configured file.
    ///
    /// No file configured means no buckets are swept; a configured but
    /// unreadable file is a startup error, not a silently empty policy set.
    pub fn load_retention_policies(
        &self,
    ) -> Result<Vec<RetentionPolicy>, Box<dyn std::error::Error>> {
        let Some(path) = &self.retention_file else {
            return Ok(Vec::new());
        };
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read retention policy file '{}': {}", path, e))?;
        let policies: Vec<RetentionPolicy> = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse retention policy file '{}': {}", path, e))?;
        Ok(policies)
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|e| format!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
