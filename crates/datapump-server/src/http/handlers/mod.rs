//! HTTP request handlers.

mod health;
mod tasks;
mod triggers;
mod workers;

pub use health::{health_check, metrics_handler};
pub use tasks::{enqueue_task, list_status_records, report_job};
pub use triggers::{
    trigger_status_checker, trigger_status_sweep, trigger_storage_sweep, trigger_task_manager,
    trigger_worker_reaper,
};
pub use workers::list_workers;
