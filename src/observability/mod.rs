//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → whatever metrics recorder the embedding daemon installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (path, backend, error) instead of formatted strings
//! - Metrics go through the `metrics` facade; no exporter is bundled

pub mod logging;
pub mod metrics;
