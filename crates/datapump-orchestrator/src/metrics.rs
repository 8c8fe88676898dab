//! Prometheus metrics collection and formatting.
//!
//! This module provides metrics in Prometheus text exposition format.

use std::fmt::Write;
use std::sync::Arc;

use datapump_core::{JobState, WorkerStatus};

use crate::provision::WorkerProvisioner;
use crate::queue::JobQueue;
use crate::store::StatusStore;

/// Collect all metrics and format as Prometheus text.
///
/// Collection is best-effort: a seam that fails to answer simply
/// contributes no samples this scrape.
pub async fn collect_metrics(
    queue: &Arc<dyn JobQueue>,
    store: &Arc<dyn StatusStore>,
    provisioner: &Arc<dyn WorkerProvisioner>,
) -> String {
    let mut output = String::new();

    collect_queue_metrics(queue, &mut output).await;
    collect_worker_metrics(provisioner, &mut output).await;
    collect_record_metrics(store, &mut output).await;

    output
}

/// Queue depth gauge.
async fn collect_queue_metrics(queue: &Arc<dyn JobQueue>, output: &mut String) {
    let Ok(depth) = queue.depth().await else {
        return;
    };

    writeln!(
        output,
        "# HELP datapump_queue_depth Tasks currently in the job queue"
    )
    .ok();
    writeln!(output, "# TYPE datapump_queue_depth gauge").ok();
    writeln!(output, "datapump_queue_depth {depth}").ok();
}

/// Collect worker metrics by status.
async fn collect_worker_metrics(provisioner: &Arc<dyn WorkerProvisioner>, output: &mut String) {
    let Ok(workers) = provisioner.list_active().await else {
        return;
    };

    // Count workers by status
    let mut provisioning = 0u64;
    let mut running = 0u64;
    let mut completed = 0u64;
    let mut failed = 0u64;

    for worker in &workers {
        match worker.status {
            WorkerStatus::Provisioning => provisioning += 1,
            WorkerStatus::Running => running += 1,
            WorkerStatus::Completed => completed += 1,
            WorkerStatus::Failed => failed += 1,
        }
    }

    // Write Prometheus format
    writeln!(output).ok();
    writeln!(
        output,
        "# HELP datapump_workers_active Number of active workers by status"
    )
    .ok();
    writeln!(output, "# TYPE datapump_workers_active gauge").ok();
    writeln!(
        output,
        "datapump_workers_active{{status=\"provisioning\"}} {provisioning}"
    )
    .ok();
    writeln!(
        output,
        "datapump_workers_active{{status=\"running\"}} {running}"
    )
    .ok();
    writeln!(
        output,
        "datapump_workers_active{{status=\"completed\"}} {completed}"
    )
    .ok();
    writeln!(
        output,
        "datapump_workers_active{{status=\"failed\"}} {failed}"
    )
    .ok();
}

/// Collect job status record metrics by state.
async fn collect_record_metrics(store: &Arc<dyn StatusStore>, output: &mut String) {
    let Ok(records) = store.list_all().await else {
        return;
    };

    // Count records by state
    let mut pending = 0u64;
    let mut running = 0u64;
    let mut done = 0u64;
    let mut error = 0u64;

    for record in &records {
        match record.state {
            JobState::Pending => pending += 1,
            JobState::Running => running += 1,
            JobState::Done => done += 1,
            JobState::Error => error += 1,
        }
    }

    // Write Prometheus format
    writeln!(output).ok();
    writeln!(
        output,
        "# HELP datapump_job_records_total Job status records by state"
    )
    .ok();
    writeln!(output, "# TYPE datapump_job_records_total gauge").ok();
    writeln!(
        output,
        "datapump_job_records_total{{state=\"pending\"}} {pending}"
    )
    .ok();
    writeln!(
        output,
        "datapump_job_records_total{{state=\"running\"}} {running}"
    )
    .ok();
    writeln!(output, "datapump_job_records_total{{state=\"done\"}} {done}").ok();
    writeln!(
        output,
        "datapump_job_records_total{{state=\"error\"}} {error}"
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::provision::InMemoryProvisioner;
    use crate::queue::InMemoryQueue;
    use crate::store::InMemoryStatusStore;

    #[tokio::test]
    async fn test_collect_metrics_empty_state() {
        let clock = Arc::new(FakeClock::new());
        let queue: Arc<dyn JobQueue> = Arc::new(InMemoryQueue::new(clock.clone()));
        let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
        let provisioner: Arc<dyn WorkerProvisioner> =
            Arc::new(InMemoryProvisioner::new(clock, 8));

        let output = collect_metrics(&queue, &store, &provisioner).await;

        // Should contain queue, worker and record metrics
        assert!(output.contains("datapump_queue_depth 0"));
        assert!(output.contains("datapump_workers_active"));
        assert!(output.contains("status=\"provisioning\""));
        assert!(output.contains("datapump_job_records_total"));

        // All counts should be 0
        assert!(output.contains("datapump_workers_active{status=\"provisioning\"} 0"));
        assert!(output.contains("datapump_job_records_total{state=\"pending\"} 0"));
    }
}
