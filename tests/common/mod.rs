//! Shared utilities for integration tests.

use std::path::Path;
use pool_state::config::PoolConfig;
use pool_state::{BackendPool, BackendRegistry, BackendStatus};

/// Build a pool whose backends carry the given statuses, in order.
pub fn pool_with(statuses: &[BackendStatus]) -> BackendPool {
    let pool = BackendPool::with_count(statuses.len()).unwrap();
    for (i, status) in statuses.iter().enumerate() {
        pool.set_status(i, *status);
    }
    pool
}

/// Statuses of every configured backend, in order.
pub fn statuses(pool: &BackendPool) -> Vec<BackendStatus> {
    (0..pool.num_backends()).map(|i| pool.status(i)).collect()
}

/// A configuration rooted in a scratch directory.
#[allow(dead_code)]
pub fn config_in(dir: &Path) -> PoolConfig {
    PoolConfig {
        pid_file_name: dir.join("pool.pid"),
        logdir: dir.join("log"),
        ..PoolConfig::default()
    }
}
