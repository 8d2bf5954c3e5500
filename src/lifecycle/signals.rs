//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//! - Checkpoint the backend status snapshot on SIGHUP
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP writes the snapshot, it does not stop the daemon

use std::io;
use crate::config::PoolConfig;
use crate::lifecycle::Shutdown;
use crate::persist;
use crate::registry::BackendRegistry;

/// What a received signal asks the daemon to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// SIGTERM / SIGINT.
    Shutdown,
    /// SIGHUP.
    Checkpoint,
}

/// Registered signal streams.
pub struct Signals {
    #[cfg(unix)]
    term: tokio::signal::unix::Signal,
    #[cfg(unix)]
    int: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hup: tokio::signal::unix::Signal,
}

impl Signals {
    /// Register the handlers. Must be called inside a Tokio runtime.
    #[cfg(unix)]
    pub fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
            hup: signal(SignalKind::hangup())?,
        })
    }

    #[cfg(not(unix))]
    pub fn new() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> SignalEvent {
        tokio::select! {
            _ = self.term.recv() => SignalEvent::Shutdown,
            _ = self.int.recv() => SignalEvent::Shutdown,
            _ = self.hup.recv() => SignalEvent::Checkpoint,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> SignalEvent {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
        SignalEvent::Shutdown
    }
}

/// Run until a shutdown signal arrives or `shutdown` is triggered elsewhere.
///
/// Each SIGHUP writes the current backend status snapshot.
pub async fn run<R>(config: &PoolConfig, registry: &R, shutdown: &Shutdown) -> io::Result<()>
where
    R: BackendRegistry + ?Sized,
{
    let mut signals = Signals::new()?;
    let mut shutdown_rx = shutdown.subscribe();

    loop {
        tokio::select! {
            event = signals.recv() => match event {
                SignalEvent::Checkpoint => {
                    tracing::info!("SIGHUP received, saving backend status");
                    // Failures are logged by the writer; the daemon keeps running.
                    if persist::write_status_file(&config.logdir, registry).is_ok() {
                        let path = persist::status_file_path(&config.logdir);
                        tracing::info!(path = %path.display(), "Backend status saved");
                    }
                }
                SignalEvent::Shutdown => {
                    tracing::info!("Shutdown signal received");
                    shutdown.trigger();
                    break;
                }
            },
            _ = shutdown_rx.recv() => {
                tracing::info!("Shutdown requested, exiting signal loop");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::registry::BackendPool;

    #[tokio::test]
    async fn test_run_stops_on_external_shutdown() {
        let config = PoolConfig::default();
        let pool = BackendPool::with_count(1).unwrap();
        let shutdown = Shutdown::new();

        let trigger = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown.trigger();
        };
        let (result, ()) = tokio::join!(run(&config, &pool, &shutdown), trigger);
        assert!(result.is_ok());
    }
}
