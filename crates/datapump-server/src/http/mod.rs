//! HTTP server for the orchestrator.
//!
//! Provides endpoints for:
//! - Periodic loop triggers (`/core/cron/...`), invoked by an external
//!   scheduler on fixed cadences
//! - Task enqueue and inspection (`/v1/...`)
//! - Health check (`/health`)
//! - Prometheus metrics (`/metrics`)

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

mod handlers;
pub mod responses;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer for admin tooling access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Periodic trigger routes
        .route("/core/cron/compute", get(handlers::trigger_task_manager))
        .route("/core/cron/check/jobs", get(handlers::trigger_status_checker))
        .route("/core/cron/cleanup/compute", get(handlers::trigger_worker_reaper))
        .route("/core/cron/cleanup/status", get(handlers::trigger_status_sweep))
        .route("/core/cron/cleanup/storage", get(handlers::trigger_storage_sweep))
        // API routes
        .route("/v1/tasks", post(handlers::enqueue_task))
        .route(
            "/v1/status",
            get(handlers::list_status_records).post(handlers::report_job),
        )
        .route("/v1/workers", get(handlers::list_workers))
        // Observability routes
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(cors)
        .with_state(state)
}
