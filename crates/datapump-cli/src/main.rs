//! Datapump CLI - Command line interface for the orchestrator server.

use clap::{Parser, Subcommand, ValueEnum};

/// Datapump CLI - orchestrator management tool
#[derive(Parser)]
#[command(name = "datapump")]
#[command(about = "CLI for the Datapump orchestrator", long_about = None)]
struct Cli {
    /// Orchestrator server address
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue a new task
    #[command(name = "enqueue-task")]
    EnqueueTask {
        /// Service name
        #[arg(short, long)]
        service: String,

        /// Queue name
        #[arg(short, long)]
        queue: String,

        /// Worker region
        #[arg(short, long)]
        region: String,

        /// Execution entrypoint reference
        #[arg(short, long)]
        entrypoint: String,

        /// Output bucket binding
        #[arg(long, default_value = "")]
        bucket: String,

        /// Output dataset binding
        #[arg(long, default_value = "")]
        dataset: String,

        /// Service-specific parameters as JSON
        #[arg(short, long, default_value = "null")]
        params: String,
    },

    /// Report a submitted remote job for a task
    #[command(name = "report-job")]
    ReportJob {
        /// Task id
        #[arg(short, long)]
        task: String,

        /// Remote job id
        #[arg(short, long)]
        job: String,
    },

    /// List active workers
    #[command(name = "list-workers")]
    ListWorkers,

    /// List job status records
    #[command(name = "list-status")]
    ListStatus,

    /// Fire one lifecycle loop trigger
    Trigger {
        /// Loop to trigger
        #[arg(value_enum)]
        target: TriggerTarget,
    },

    /// Check server health
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum TriggerTarget {
    /// Task manager (lease + provision)
    Compute,
    /// Status checker (remote job polling)
    CheckJobs,
    /// Worker reaper
    CleanupCompute,
    /// Status store sweep
    CleanupStatus,
    /// Storage retention sweep
    CleanupStorage,
}

impl TriggerTarget {
    fn path(&self) -> &'static str {
        match self {
            Self::Compute => "/core/cron/compute",
            Self::CheckJobs => "/core/cron/check/jobs",
            Self::CleanupCompute => "/core/cron/cleanup/compute",
            Self::CleanupStatus => "/core/cron/cleanup/status",
            Self::CleanupStorage => "/core/cron/cleanup/storage",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let client = reqwest::Client::new();
    let addr = cli.addr.trim_end_matches('/').to_string();

    match cli.command {
        Commands::EnqueueTask {
            service,
            queue,
            region,
            entrypoint,
            bucket,
            dataset,
            params,
        } => {
            enqueue_task(
                &client, &addr, service, queue, region, entrypoint, bucket, dataset, params,
            )
            .await?;
        }
        Commands::ReportJob { task, job } => {
            report_job(&client, &addr, task, job).await?;
        }
        Commands::ListWorkers => {
            print_json(&client, &addr, "/v1/workers").await?;
        }
        Commands::ListStatus => {
            print_json(&client, &addr, "/v1/status").await?;
        }
        Commands::Trigger { target } => {
            trigger(&client, &addr, target).await?;
        }
        Commands::Health => {
            print_json(&client, &addr, "/health").await?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn enqueue_task(
    client: &reqwest::Client,
    addr: &str,
    service: String,
    queue: String,
    region: String,
    entrypoint: String,
    bucket: String,
    dataset: String,
    params: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let params: serde_json::Value =
        serde_json::from_str(&params).map_err(|e| format!("Invalid --params JSON: {}", e))?;

    let body = serde_json::json!({
        "service": service,
        "queue": queue,
        "region": region,
        "entrypoint": entrypoint,
        "bucket": bucket,
        "dataset": dataset,
        "params": params,
    });

    let response = client
        .post(format!("{}/v1/tasks", addr))
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    if !status.is_success() {
        return Err(format!("Enqueue failed ({}): {}", status, body).into());
    }

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn report_job(
    client: &reqwest::Client,
    addr: &str,
    task: String,
    job: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::json!({ "task_id": task, "job_id": job });

    let response = client
        .post(format!("{}/v1/status", addr))
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(format!("Report failed: HTTP {}", response.status()).into());
    }

    println!("ok");
    Ok(())
}

async fn trigger(
    client: &reqwest::Client,
    addr: &str,
    target: TriggerTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = client
        .get(format!("{}{}", addr, target.path()))
        .send()
        .await?;

    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    if !status.is_success() {
        return Err(format!("Trigger failed ({}): {}", status, body).into());
    }

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn print_json(
    client: &reqwest::Client,
    addr: &str,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = client.get(format!("{}{}", addr, path)).send().await?;

    if !response.status().is_success() {
        return Err(format!("Request failed: HTTP {}", response.status()).into());
    }

    let body: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
