//! Per-bucket retention policies.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Retention policy for one storage bucket: objects older than the look-back
/// window are eligible for deletion.
///
/// Policies are operator-managed configuration, read-only to the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Bucket the policy applies to.
    pub bucket: String,

    /// Look-back window in days.
    pub lookback_days: u32,
}

impl RetentionPolicy {
    /// Create a policy.
    pub fn new(bucket: impl Into<String>, lookback_days: u32) -> Self {
        Self {
            bucket: bucket.into(),
            lookback_days,
        }
    }

    /// The cutoff instant: objects created before it are expired.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.lookback_days))
    }

    /// Whether an object created at `created_at` has outlived the window.
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        created_at < self.cutoff(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let policy = RetentionPolicy::new("report-bucket", 7);
        let now = Utc::now();

        assert!(policy.is_expired(now - Duration::days(8), now));
        assert!(!policy.is_expired(now - Duration::days(3), now));
        // Exactly on the cutoff is not yet expired.
        assert!(!policy.is_expired(policy.cutoff(now), now));
    }
}
