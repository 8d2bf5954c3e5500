//! Pool state daemon.
//!
//! Brings the daemon's durable state up, keeps it current while running and
//! saves it on the way down.
//!
//! ```text
//!   start                 running                    stop
//! ┌──────────────┐     ┌──────────────────┐     ┌───────────────────┐
//! │ singleton    │     │ SIGHUP           │     │ SIGTERM / SIGINT  │
//! │ check        │     │  → save status   │     │  → save status    │
//! │ restore or   │ ──▶ │                  │ ──▶ │  → remove pid     │
//! │ discard      │     │                  │     │                   │
//! │ write pid    │     │                  │     │                   │
//! └──────────────┘     └──────────────────┘     └───────────────────┘
//! ```

use std::path::PathBuf;
use clap::Parser;

use pool_state::config::{load_config, PoolConfig};
use pool_state::lifecycle::{self, signals, StartupError};
use pool_state::observability::logging;
use pool_state::persist::StatusRestore;
use pool_state::{BackendPool, Shutdown};

#[derive(Parser)]
#[command(name = "pool-stated")]
#[command(
    about = "Keeps the pid file and backend status snapshot of the pooling daemon",
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Discard the previous backend status instead of restoring it.
    #[arg(short = 'D', long)]
    discard_status: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PoolConfig::default(),
    };
    if cli.discard_status {
        config.discard_status = true;
    }

    logging::init(&config.logging);

    tracing::info!(
        pid_file = %config.pid_file_name.display(),
        logdir = %config.logdir.display(),
        backends = config.backends.len(),
        discard_status = config.discard_status,
        "pool-stated v0.1.0 starting"
    );

    let pool = BackendPool::from_config(&config.backends)?;
    let shutdown = Shutdown::new();

    let report = match lifecycle::start(&config, &pool, &shutdown) {
        Ok(report) => report,
        // Already logged and torn down by the pid file writer and startup.
        Err(StartupError::PidFile(_)) => std::process::exit(1),
        Err(e) => return Err(e.into()),
    };

    if let Some(StatusRestore::Restored { down, .. }) = &report.restore {
        for backend in down.iter().filter_map(|&i| pool.get(i)) {
            tracing::warn!(backend = %backend.name, "Backend stays down after restart");
        }
    }

    tracing::info!(
        pid = report.pid,
        backends = pool.len(),
        available = pool.available_count(),
        "Daemon state ready"
    );

    let running = signals::run(&config, &pool, &shutdown);
    lifecycle::shutdown::run_then_finish(running, &config, &pool, &shutdown).await?;
    Ok(())
}
