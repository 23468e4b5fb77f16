//! Calor Strategy CLI
//!
//! Thin runner over the orchestration engine: one-shot or continuous batch
//! execution, status reporting and per-task insights. In continuous mode a
//! ctrl-c stops the loop after the current task completes; in-flight model
//! calls are never cancelled mid-task.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use calor_strategy::services::graph::{GraphMirror, MemoryGraphMirror, NullGraphMirror};
use calor_strategy::storage::{ConfigService, Database};
use calor_strategy::{AnthropicProvider, CostCalculator, Orchestrator, TriggerSource};

#[derive(Parser)]
#[command(name = "calor-strategy")]
#[command(about = "Calor strategy task orchestrator", long_about = None)]
struct Cli {
    /// Override the database file location
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one batch of eligible backlog tasks
    Run {
        /// Maximum tasks per batch
        #[arg(short, long)]
        limit: Option<usize>,
        /// Keep polling for new tasks until interrupted
        #[arg(short, long)]
        continuous: bool,
        /// Seconds to sleep between cycles in continuous mode
        #[arg(short, long)]
        interval: Option<u64>,
        /// Write a JSON status report to this file when done
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the orchestration status report
    Status,
    /// Print lineage insights for one task
    Insights {
        /// Task id to inspect
        task_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = ConfigService::new().context("Failed to load settings")?;
    let settings = config.settings().clone();

    let db = match cli.database.or_else(|| settings.database_path.clone()) {
        Some(path) => Database::open(&path),
        None => Database::new(),
    }
    .context("Failed to open database")?;

    let provider = Arc::new(AnthropicProvider::new(settings.api_key.clone()));
    let mirror: Arc<dyn GraphMirror> = if settings.mirror_enabled {
        Arc::new(MemoryGraphMirror::new())
    } else {
        Arc::new(NullGraphMirror)
    };

    let orchestrator =
        Orchestrator::new(&db, provider, mirror).context("Failed to build orchestrator")?;

    match cli.command {
        Commands::Run {
            limit,
            continuous,
            interval,
            report,
        } => {
            let limit = limit.unwrap_or(settings.batch_limit);
            let interval = interval.unwrap_or(settings.poll_interval_secs);

            if continuous {
                run_continuous(&orchestrator, limit, interval).await?;
            } else {
                let batch = orchestrator.execute_batch(limit).await?;
                log_batch(batch.total, batch.succeeded, batch.failed, batch.total_cost_microdollars());
            }

            if let Some(path) = report {
                let status = orchestrator.get_status_report()?;
                std::fs::write(&path, serde_json::to_string_pretty(&status)?)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                tracing::info!(path = %path.display(), "Wrote status report");
            }
        }
        Commands::Status => {
            let status = orchestrator.get_status_report()?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Insights { task_id } => {
            let insights = orchestrator.get_task_insights(&task_id);
            println!("{}", serde_json::to_string_pretty(&insights)?);
        }
    }

    Ok(())
}

fn log_batch(total: usize, succeeded: usize, failed: usize, cost_microdollars: i64) {
    tracing::info!(
        total,
        succeeded,
        failed,
        cost = %CostCalculator::format_cost_dollars(cost_microdollars),
        "Batch finished"
    );
}

/// Poll for eligible tasks until interrupted. Tasks execute one at a time;
/// the interrupt flag is checked between tasks, so a ctrl-c lets the
/// in-flight attempt finish and then stops.
async fn run_continuous(orchestrator: &Orchestrator, limit: usize, interval_secs: u64) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let wake = Arc::new(tokio::sync::Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        let wake = Arc::clone(&wake);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping after the current task");
                shutdown.store(true, Ordering::SeqCst);
                wake.notify_waiters();
            }
        });
    }

    while !shutdown.load(Ordering::SeqCst) {
        let tasks = orchestrator.get_next_tasks(limit)?;
        if tasks.is_empty() {
            tracing::info!(seconds = interval_secs, "No eligible tasks, sleeping");
            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_secs(interval_secs)) => {}
                _ = wake.notified() => {}
            }
            continue;
        }

        let (mut succeeded, mut failed, mut cost) = (0usize, 0usize, 0i64);
        let total = tasks.len();
        for task in &tasks {
            let result = orchestrator
                .execute_task(task, TriggerSource::Scheduled)
                .await?;
            if result.success {
                succeeded += 1;
            } else {
                failed += 1;
            }
            cost += result.cost_microdollars;

            if shutdown.load(Ordering::SeqCst) {
                break;
            }
        }
        log_batch(total, succeeded, failed, cost);
    }

    Ok(())
}
