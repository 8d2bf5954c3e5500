//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track its live status (ConnectWait/Up/Down)

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use serde::Serialize;

/// Backend status enum.
///
/// The discriminants are the codes stored in the status snapshot file.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
    /// Slot not in use.
    Unused = 0,
    /// Assumed reachable; verified on first use.
    ConnectWait = 1,
    /// Live and serving.
    Up = 2,
    /// Detached from the pool.
    Down = 3,
}

impl BackendStatus {
    /// On-disk code for this status.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Return true if the backend may receive traffic.
    pub fn is_available(self) -> bool {
        matches!(self, BackendStatus::ConnectWait | BackendStatus::Up)
    }
}

impl From<u8> for BackendStatus {
    fn from(val: u8) -> Self {
        match val {
            1 => BackendStatus::ConnectWait,
            2 => BackendStatus::Up,
            3 => BackendStatus::Down,
            _ => BackendStatus::Unused,
        }
    }
}

impl From<u32> for BackendStatus {
    fn from(val: u32) -> Self {
        u8::try_from(val).map(BackendStatus::from).unwrap_or(BackendStatus::Unused)
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendStatus::Unused => "unused",
            BackendStatus::ConnectWait => "connect_wait",
            BackendStatus::Up => "up",
            BackendStatus::Down => "down",
        };
        f.write_str(s)
    }
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Unique backend identifier.
    pub name: String,
    /// Current status (see `BackendStatus` for the encoding).
    status: AtomicU8,
}

impl Backend {
    /// Create a new backend in the `ConnectWait` state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: AtomicU8::new(BackendStatus::ConnectWait as u8),
        }
    }

    /// Get the current status.
    pub fn status(&self) -> BackendStatus {
        BackendStatus::from(self.status.load(Ordering::Relaxed))
    }

    /// Replace the current status, returning the previous one.
    pub fn set_status(&self, status: BackendStatus) -> BackendStatus {
        BackendStatus::from(self.status.swap(status as u8, Ordering::Relaxed))
    }

    /// Return true if backend may receive traffic (ConnectWait or Up).
    pub fn is_available(&self) -> bool {
        self.status().is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_backend_waits_for_connect() {
        let b = Backend::new("primary");
        assert_eq!(b.status(), BackendStatus::ConnectWait);
        assert!(b.is_available());
    }

    #[test]
    fn test_status_transitions() {
        let b = Backend::new("primary");
        assert_eq!(b.set_status(BackendStatus::Down), BackendStatus::ConnectWait);
        assert!(!b.is_available());

        b.set_status(BackendStatus::Up);
        assert_eq!(b.status(), BackendStatus::Up);
        assert_eq!(b.set_status(BackendStatus::ConnectWait), BackendStatus::Up);
    }

    #[test]
    fn test_code_conversion() {
        for status in [
            BackendStatus::Unused,
            BackendStatus::ConnectWait,
            BackendStatus::Up,
            BackendStatus::Down,
        ] {
            assert_eq!(BackendStatus::from(status.code()), status);
        }
        assert_eq!(BackendStatus::from(77u32), BackendStatus::Unused);
        assert_eq!(BackendStatus::from(0x0300u32), BackendStatus::Unused);
    }
}
