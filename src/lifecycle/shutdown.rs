//! Shutdown coordination for the daemon.

use std::future::Future;
use std::io;
use thiserror::Error;
use tokio::sync::broadcast;
use crate::config::PoolConfig;
use crate::persist::{self, PersistError, PersistResult};
use crate::registry::BackendRegistry;

/// Hook that releases process-wide resources before the daemon aborts.
pub trait ResourceTeardown {
    fn release(&self);
}

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown triggered with no subscribers");
        }
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTeardown for Shutdown {
    fn release(&self) {
        tracing::warn!(subscribers = self.receiver_count(), "Releasing shared resources");
        self.trigger();
    }
}

/// Persist the final backend status and remove the pid file.
///
/// Both steps run even if the first fails; the first error is returned.
pub fn finish<R>(config: &PoolConfig, registry: &R) -> PersistResult<()>
where
    R: BackendRegistry + ?Sized,
{
    let status = persist::write_status_file(&config.logdir, registry);
    let pid = persist::remove_pid_file(&config.pid_file_name).map(|_| ());

    tracing::info!(
        status_saved = status.is_ok(),
        pid_removed = pid.is_ok(),
        "Shutdown complete"
    );
    status.and(pid)
}

/// Errors from the daemon's running phase.
#[derive(Debug, Error)]
pub enum RunError {
    /// The signal loop could not run.
    #[error("signal handling failed: {0}")]
    Signals(#[source] io::Error),

    /// The final status snapshot or pid file cleanup failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Drive `running` to completion, then always `finish`.
///
/// A failed running phase still saves the snapshot and removes the pid file;
/// its error wins over a cleanup error.
pub async fn run_then_finish<F, R>(
    running: F,
    config: &PoolConfig,
    registry: &R,
    shutdown: &Shutdown,
) -> Result<(), RunError>
where
    F: Future<Output = io::Result<()>>,
    R: BackendRegistry + ?Sized,
{
    let run_result = running.await;
    if let Err(e) = &run_result {
        tracing::error!(error = %e, "Signal handling failed, shutting down");
        shutdown.trigger();
    }

    let finish_result = finish(config, registry);
    run_result.map_err(RunError::Signals)?;
    finish_result.map_err(RunError::from)
}
