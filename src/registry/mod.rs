//! Live backend registry.
//!
//! # Data Flow
//! ```text
//! config backends
//!     → pool.rs (one Backend per entry, ordinal = position)
//!     → backend.rs (atomic per-backend status)
//!     → BackendRegistry trait (read by snapshot writer, written by restore)
//! ```
//!
//! # Design Decisions
//! - Status is per-backend and updated through atomics
//! - The persistence core only sees the `BackendRegistry` trait
//! - Backend count is capped by the snapshot width

pub mod backend;
pub mod pool;

pub use backend::{Backend, BackendStatus};
pub use pool::{BackendPool, RegistryError};

/// Per-index status access to the configured backends.
pub trait BackendRegistry {
    /// Number of configured backends.
    fn num_backends(&self) -> usize;

    /// Status of the backend at `index`.
    fn status(&self, index: usize) -> BackendStatus;

    /// Replace the status of the backend at `index`.
    fn set_status(&self, index: usize, status: BackendStatus);
}
