//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Singleton check → Restore backend status → Write pid file
//!
//! Running (signals.rs):
//!     SIGHUP → Save backend status
//!     SIGTERM/SIGINT → Trigger shutdown
//!
//! Shutdown (shutdown.rs):
//!     Save backend status → Remove pid file → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: a pid file that cannot be written aborts startup
//! - Status snapshot problems never abort; backends fall back to CONNECT_WAIT
//! - Fatal errors release shared resources before the caller exits

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{ResourceTeardown, RunError, Shutdown};
pub use startup::{start, StartupError, StartupReport};
