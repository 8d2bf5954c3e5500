//! Backend status snapshot file.
//!
//! # Responsibilities
//! - Persist the live status of every configured backend
//! - Restore it into the registry at startup, or discard it
//!
//! # Restore rules
//! ```text
//! stored DOWN      → live DOWN
//! anything else    → live CONNECT_WAIT
//! nobody woken up  → snapshot is bogus, every backend CONNECT_WAIT
//! ```
//!
//! # Design Decisions
//! - A short record is corrupt; there is no partial-record recovery
//! - Writes are not fsynced; losing the latest snapshot only costs a re-probe
//! - An all-DOWN snapshot cannot be told apart from a stale or damaged one,
//!   so it fails open. A genuinely all-down pool at shutdown restarts as
//!   CONNECT_WAIT too.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use crate::observability::metrics;
use crate::persist::error::{PersistError, PersistResult};
use crate::persist::record::{StatusRecord, RECORD_SIZE};
use crate::registry::{BackendRegistry, BackendStatus};

/// Name of the snapshot file inside the log directory.
pub const STATUS_FILE_NAME: &str = "pool_status";

/// Outcome of a successful status read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusRestore {
    /// The snapshot was applied to the registry.
    Restored {
        /// Backends left in DOWN state.
        down: Vec<usize>,
        /// Every stored entry was DOWN, so all backends were reset to CONNECT_WAIT.
        bogus: bool,
    },
    /// The snapshot was thrown away without being read.
    Discarded {
        /// False if the file could not be deleted.
        removed: bool,
    },
}

/// Location of the snapshot file for a log directory.
pub fn status_file_path(logdir: &Path) -> PathBuf {
    logdir.join(STATUS_FILE_NAME)
}

/// Read the snapshot from `logdir` and apply it to `registry`.
///
/// With `discard` set the file is deleted instead and the registry is left
/// untouched.
pub fn read_status_file<R>(
    logdir: &Path,
    discard: bool,
    registry: &R,
) -> PersistResult<StatusRestore>
where
    R: BackendRegistry + ?Sized,
{
    let path = status_file_path(logdir);
    let result = read_status(&path, discard, registry);

    let outcome = match &result {
        Ok(StatusRestore::Restored { bogus: false, .. }) => "restored",
        Ok(StatusRestore::Restored { bogus: true, .. }) => "bogus",
        Ok(StatusRestore::Discarded { .. }) => "discarded",
        Err(PersistError::NotFound { .. }) => "not_found",
        Err(PersistError::Corrupt { .. }) => "corrupt",
        Err(_) => "io_error",
    };
    metrics::record_status_read(outcome);

    result
}

fn read_status<R>(path: &Path, discard: bool, registry: &R) -> PersistResult<StatusRestore>
where
    R: BackendRegistry + ?Sized,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            let err = PersistError::open(path, e);
            if err.is_not_found() {
                tracing::info!(path = %path.display(), "Backend status file does not exist");
            } else {
                tracing::error!(error = %err, "Could not open backend status file");
            }
            return Err(err);
        }
    };

    if discard {
        drop(file);
        let removed = match fs::remove_file(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Backend status file discarded");
                true
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to discard backend status file"
                );
                false
            }
        };
        return Ok(StatusRestore::Discarded { removed });
    }

    let mut buf = Vec::with_capacity(RECORD_SIZE);
    file.take(RECORD_SIZE as u64)
        .read_to_end(&mut buf)
        .map_err(|e| {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Could not read backend status file"
            );
            PersistError::io("read", path, e)
        })?;

    let bytes: [u8; RECORD_SIZE] = match buf.try_into() {
        Ok(bytes) => bytes,
        Err(short) => {
            tracing::error!(
                path = %path.display(),
                expected = RECORD_SIZE,
                actual = short.len(),
                "Backend status file is truncated"
            );
            return Err(PersistError::Corrupt {
                path: path.to_path_buf(),
                expected: RECORD_SIZE,
                actual: short.len(),
            });
        }
    };

    Ok(restore(&StatusRecord::from_bytes(&bytes), registry))
}

/// Apply a decoded snapshot to the configured backends.
pub fn restore<R>(record: &StatusRecord, registry: &R) -> StatusRestore
where
    R: BackendRegistry + ?Sized,
{
    let count = registry.num_backends();
    let mut down = Vec::new();
    let mut someone_woke_up = false;

    for i in 0..count {
        if record.is_down(i) {
            registry.set_status(i, BackendStatus::Down);
            tracing::info!(backend = i, "Backend restored to down status");
            down.push(i);
        } else {
            registry.set_status(i, BackendStatus::ConnectWait);
            someone_woke_up = true;
        }
    }

    let bogus = !someone_woke_up && count > 0;
    if bogus {
        tracing::warn!(
            backends = count,
            "Every backend was down in the status file; regarding it as bogus"
        );
        for i in 0..count {
            registry.set_status(i, BackendStatus::ConnectWait);
        }
        down.clear();
    }

    for i in 0..count {
        metrics::record_backend_status(i, registry.status(i));
    }

    StatusRestore::Restored { down, bogus }
}

/// Write the live status of every configured backend to `logdir`.
pub fn write_status_file<R>(logdir: &Path, registry: &R) -> PersistResult<()>
where
    R: BackendRegistry + ?Sized,
{
    let path = status_file_path(logdir);
    let result = write_status(&path, registry);
    metrics::record_status_write(result.is_ok());

    if let Err(e) = &result {
        tracing::error!(error = %e, "Could not write backend status file");
    } else {
        tracing::debug!(
            path = %path.display(),
            backends = registry.num_backends(),
            "Wrote backend status file"
        );
    }
    result
}

fn write_status<R>(path: &Path, registry: &R) -> PersistResult<()>
where
    R: BackendRegistry + ?Sized,
{
    let record = StatusRecord::from_registry(registry);
    let bytes = record.to_bytes();

    let mut file = File::create(path).map_err(|e| PersistError::io("open", path, e))?;
    let written = file.write(&bytes).map_err(|e| PersistError::io("write", path, e))?;
    if written != RECORD_SIZE {
        return Err(PersistError::io(
            "write",
            path,
            io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, RECORD_SIZE),
            ),
        ));
    }
    Ok(())
}
