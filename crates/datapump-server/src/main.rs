//! Datapump trigger and admin HTTP server.
//!
//! Hosts the five periodic trigger endpoints (invoked by an external cron
//! scheduler) plus the enqueue/admin API. Loops run only when triggered;
//! there is no in-process scheduler.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod http;
mod state;

use config::ServerConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load config
    let config = ServerConfig::from_env()?;
    let policies = config.load_retention_policies()?;
    info!(
        policies = policies.len(),
        lease_secs = config.orchestrator.lease_duration_secs,
        quota = config.orchestrator.max_workers_per_region,
        "Configuration loaded"
    );

    // Create shared state over the in-memory backends
    let state = AppState::in_memory(config.orchestrator.clone(), policies);

    // Create HTTP router
    let router = http::create_router(state);

    // Start HTTP server
    let listener = TcpListener::bind(&config.http_addr).await?;
    info!("HTTP server listening on {} (triggers + admin)", config.http_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
