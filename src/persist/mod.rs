//! Durable daemon state.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     status_file.rs (restore or discard snapshot → registry)
//!     → pid_file.rs (singleton check, record own pid, fsync)
//!
//! Status change / shutdown:
//!     registry → record.rs (fixed-width snapshot) → status_file.rs
//! ```
//!
//! # Design Decisions
//! - Every call is synchronous and stateless; no buffer outlives a call
//! - Status file problems degrade to CONNECT_WAIT, never abort
//! - Pid file write problems are `PersistError::Fatal`

pub mod error;
pub mod pid_file;
pub mod record;
pub mod status_file;

pub use error::{PersistError, PersistResult};
pub use pid_file::{check_running, read_pid_file, remove_pid_file, write_pid_file, PidState};
pub use record::{StatusRecord, RECORD_SIZE};
pub use status_file::{
    read_status_file, status_file_path, write_status_file, StatusRestore, STATUS_FILE_NAME,
};

/// Number of slots in a status snapshot, and the cap on configured backends.
pub const MAX_NUM_BACKENDS: usize = 128;
