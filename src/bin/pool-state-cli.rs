use std::path::PathBuf;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use pool_state::persist::{self, PidState, StatusRestore, MAX_NUM_BACKENDS};
use pool_state::{BackendPool, BackendRegistry};

#[derive(Parser)]
#[command(name = "pool-state-cli")]
#[command(
    about = "Inspect the pool daemon's pid file and backend status snapshot",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the recorded pid and whether that process is alive
    Pid {
        /// Path to the pid file
        path: PathBuf,
    },
    /// Show how the status snapshot would be restored
    Status {
        /// Log directory holding the snapshot
        logdir: PathBuf,
        /// Number of configured backends
        #[arg(short, long, default_value_t = MAX_NUM_BACKENDS)]
        backends: usize,
    },
    /// Delete the status snapshot
    Discard {
        /// Log directory holding the snapshot
        logdir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Pid { path } => {
            let state = persist::check_running(&path)?;
            let (pid, running) = match state {
                PidState::NotRunning => (None, false),
                PidState::Running(pid) => (Some(pid), true),
                PidState::Stale(pid) => (Some(pid), false),
            };
            json!({
                "path": path.display().to_string(),
                "pid": pid,
                "running": running,
            })
        }
        Commands::Status { logdir, backends } => {
            let pool = BackendPool::with_count(backends)?;
            let restore = persist::read_status_file(&logdir, false, &pool)?;
            status_report(&logdir, &pool, &restore)
        }
        Commands::Discard { logdir } => {
            let pool = BackendPool::default();
            let restore = persist::read_status_file(&logdir, true, &pool)?;
            let removed = matches!(restore, StatusRestore::Discarded { removed: true });
            json!({
                "path": persist::status_file_path(&logdir).display().to_string(),
                "removed": removed,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn status_report(logdir: &std::path::Path, pool: &BackendPool, restore: &StatusRestore) -> Value {
    let bogus = matches!(restore, StatusRestore::Restored { bogus: true, .. });
    let backends: Vec<Value> = (0..pool.num_backends())
        .map(|i| json!({ "index": i, "status": pool.status(i) }))
        .collect();

    json!({
        "path": persist::status_file_path(logdir).display().to_string(),
        "bogus": bogus,
        "backends": backends,
    })
}
