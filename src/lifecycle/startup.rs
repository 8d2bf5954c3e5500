//! Startup orchestration.
//!
//! # Responsibilities
//! - Refuse to start when another instance owns the pid file
//! - Restore (or discard) the previous backend status
//! - Record our own pid durably
//!
//! # Design Decisions
//! - Status is restored before the pid is written
//! - A pid file write failure releases shared resources, then surfaces
//!   `StartupError::PidFile`; the binary exits with status 1

use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use crate::config::PoolConfig;
use crate::lifecycle::shutdown::ResourceTeardown;
use crate::persist::{self, PersistError, PidState, StatusRestore};
use crate::registry::BackendRegistry;

/// Errors that stop the daemon from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A live process already owns the pid file.
    #[error("another instance is already running with pid {pid} (pid file {})", path.display())]
    AlreadyRunning { pid: u32, path: PathBuf },

    /// The pid file could not be written.
    #[error(transparent)]
    PidFile(#[from] PersistError),
}

/// What startup found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// Pid written to the pid file.
    pub pid: u32,
    /// Outcome of the status restore, `None` if nothing was restored.
    pub restore: Option<StatusRestore>,
}

/// Bring the daemon's durable state up.
pub fn start<R, T>(
    config: &PoolConfig,
    registry: &R,
    teardown: &T,
) -> Result<StartupReport, StartupError>
where
    R: BackendRegistry + ?Sized,
    T: ResourceTeardown + ?Sized,
{
    ensure_logdir(config);
    check_singleton(config)?;

    let restore = match persist::read_status_file(&config.logdir, config.discard_status, registry) {
        Ok(restore) => {
            tracing::info!(?restore, "Backend status file processed");
            Some(restore)
        }
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring backend status file; backends will be re-probed");
            None
        }
    };

    match persist::write_pid_file(&config.pid_file_name) {
        Ok(pid) => Ok(StartupReport { pid, restore }),
        Err(e) => {
            tracing::debug!("Cannot continue without a pid file");
            teardown.release();
            Err(StartupError::PidFile(e))
        }
    }
}

fn ensure_logdir(config: &PoolConfig) {
    if let Err(e) = fs::create_dir_all(&config.logdir) {
        tracing::warn!(
            logdir = %config.logdir.display(),
            error = %e,
            "Could not create log directory; backend status will not be saved"
        );
    }
}

fn check_singleton(config: &PoolConfig) -> Result<(), StartupError> {
    let path = &config.pid_file_name;

    match persist::check_running(path) {
        Ok(PidState::Running(pid)) if pid != std::process::id() => {
            tracing::error!(pid, path = %path.display(), "Another instance is already running");
            Err(StartupError::AlreadyRunning { pid, path: path.clone() })
        }
        Ok(PidState::Running(_)) | Ok(PidState::NotRunning) => Ok(()),
        Ok(PidState::Stale(pid)) => {
            tracing::info!(pid, path = %path.display(), "Overwriting stale pid file");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Pid file is unreadable; overwriting it");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::registry::{BackendPool, BackendStatus};

    #[derive(Default)]
    struct CountingTeardown(AtomicUsize);

    impl CountingTeardown {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl ResourceTeardown for CountingTeardown {
        fn release(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn config_in(dir: &std::path::Path) -> PoolConfig {
        PoolConfig {
            pid_file_name: dir.join("pool.pid"),
            logdir: dir.join("log"),
            ..PoolConfig::default()
        }
    }

    #[test]
    fn test_fresh_start() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let pool = BackendPool::with_count(2).unwrap();
        let teardown = CountingTeardown::default();

        let report = start(&config, &pool, &teardown).unwrap();
        assert_eq!(report.pid, std::process::id());
        assert_eq!(report.restore, None);
        assert!(config.logdir.is_dir());
        assert_eq!(teardown.count(), 0);
    }

    #[test]
    fn test_restores_previous_status() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.logdir).unwrap();

        let old = BackendPool::with_count(2).unwrap();
        old.set_status(0, BackendStatus::Down);
        persist::write_status_file(&config.logdir, &old).unwrap();

        let pool = BackendPool::with_count(2).unwrap();
        let report = start(&config, &pool, &CountingTeardown::default()).unwrap();
        assert_eq!(report.restore, Some(StatusRestore::Restored { down: vec![0], bogus: false }));
        assert_eq!(pool.status(0), BackendStatus::Down);
    }

    #[test]
    fn test_corrupt_status_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.logdir).unwrap();
        fs::write(persist::status_file_path(&config.logdir), b"short").unwrap();

        let pool = BackendPool::with_count(2).unwrap();
        let report = start(&config, &pool, &CountingTeardown::default()).unwrap();
        assert_eq!(report.restore, None);
        assert_eq!(pool.available_count(), 2);
    }

    #[test]
    fn test_pid_write_failure_releases_resources() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.pid_file_name = dir.path().join("missing/pool.pid");

        let pool = BackendPool::with_count(1).unwrap();
        let teardown = CountingTeardown::default();
        let err = start(&config, &pool, &teardown).unwrap_err();

        assert!(matches!(&err, StartupError::PidFile(e) if e.is_fatal()));
        assert_eq!(teardown.count(), 1);
    }

    #[test]
    fn test_refuses_when_another_instance_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        // pid 1 always exists.
        fs::write(&config.pid_file_name, b"1\0").unwrap();

        let pool = BackendPool::with_count(1).unwrap();
        let err = start(&config, &pool, &CountingTeardown::default()).unwrap_err();
        assert!(matches!(err, StartupError::AlreadyRunning { pid: 1, .. }));
    }
}
