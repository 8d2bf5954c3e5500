//! Error definitions for the persistence core.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing daemon state files.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The file does not exist. The caller decides what absence means.
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but holds fewer bytes than one full record.
    #[error("{} is corrupt: expected {expected} bytes, read {actual}", path.display())]
    Corrupt {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// Reading, writing or removing an existing path failed.
    #[error("could not {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The pid file could not be made durable. The daemon must not keep running.
    #[error("fatal: could not {op} pid file {}: {source}", path.display())]
    Fatal {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        PersistError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn fatal(op: &'static str, path: &Path, source: io::Error) -> Self {
        PersistError::Fatal {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Map an open failure: a missing file is `NotFound`, anything else is `Io`.
    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            PersistError::NotFound { path: path.to_path_buf() }
        } else {
            Self::io("open", path, source)
        }
    }

    /// Return true for expected absence of the file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistError::NotFound { .. })
    }

    /// Return true if the daemon has to shut down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PersistError::Fatal { .. })
    }

    /// Path the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            PersistError::NotFound { path }
            | PersistError::Corrupt { path, .. }
            | PersistError::Io { path, .. }
            | PersistError::Fatal { path, .. } => path,
        }
    }
}

/// Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;
