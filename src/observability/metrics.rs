//! Metrics collection.
//!
//! # Metrics
//! - `pool_state_status_reads_total` (counter): status file reads by outcome
//! - `pool_state_status_writes_total` (counter): status file writes by outcome
//! - `pool_state_pid_writes_total` (counter): pid file writes by outcome
//! - `pool_state_backend_status` (gauge): restored status code per backend

use crate::registry::BackendStatus;

fn outcome(success: bool) -> &'static str {
    if success { "ok" } else { "error" }
}

/// Count a status file read.
pub fn record_status_read(outcome: &'static str) {
    ::metrics::counter!("pool_state_status_reads_total", "outcome" => outcome).increment(1);
}

/// Count a status file write.
pub fn record_status_write(success: bool) {
    ::metrics::counter!("pool_state_status_writes_total", "outcome" => outcome(success))
        .increment(1);
}

/// Count a pid file write.
pub fn record_pid_write(success: bool) {
    ::metrics::counter!("pool_state_pid_writes_total", "outcome" => outcome(success)).increment(1);
}

/// Publish the status of one backend.
pub fn record_backend_status(index: usize, status: BackendStatus) {
    ::metrics::gauge!("pool_state_backend_status", "backend" => index.to_string())
        .set(f64::from(status.code()));
}
