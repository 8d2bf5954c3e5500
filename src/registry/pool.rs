//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the configured backends in ordinal order
//! - Expose per-index status access for the persistence core

use std::sync::Arc;
use thiserror::Error;
use crate::config::BackendConfig;
use crate::persist::MAX_NUM_BACKENDS;
use crate::registry::{BackendRegistry, backend::{Backend, BackendStatus}};

/// Errors raised while building the pool.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// More backends configured than the status snapshot can hold.
    #[error("{count} backends configured, at most {max} are supported")]
    TooManyBackends { count: usize, max: usize },
}

/// The live backend registry.
#[derive(Debug, Default)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
}

impl BackendPool {
    /// Create a pool from configuration. Backends keep their configured order.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, RegistryError> {
        if configs.len() > MAX_NUM_BACKENDS {
            return Err(RegistryError::TooManyBackends {
                count: configs.len(),
                max: MAX_NUM_BACKENDS,
            });
        }

        let backends = configs
            .iter()
            .map(|c| Arc::new(Backend::new(c.name.clone())))
            .collect();

        Ok(Self { backends })
    }

    /// Create a pool of `count` anonymous backends.
    pub fn with_count(count: usize) -> Result<Self, RegistryError> {
        let configs: Vec<BackendConfig> = (0..count)
            .map(|i| BackendConfig { name: format!("backend{}", i) })
            .collect();
        Self::from_config(&configs)
    }

    /// Number of configured backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Backend at the given ordinal.
    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    /// Number of backends that may receive traffic.
    pub fn available_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_available()).count()
    }
}

impl BackendRegistry for BackendPool {
    fn num_backends(&self) -> usize {
        self.backends.len()
    }

    fn status(&self, index: usize) -> BackendStatus {
        self.backends
            .get(index)
            .map(|b| b.status())
            .unwrap_or(BackendStatus::Unused)
    }

    fn set_status(&self, index: usize, status: BackendStatus) {
        match self.backends.get(index) {
            Some(b) => {
                b.set_status(status);
            }
            None => tracing::debug!(index, "Ignoring status update for unknown backend"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_keeps_order() {
        let configs = vec![
            BackendConfig { name: "a".into() },
            BackendConfig { name: "b".into() },
        ];
        let pool = BackendPool::from_config(&configs).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(1).unwrap().name, "b");
        assert_eq!(pool.available_count(), 2);
    }

    #[test]
    fn test_rejects_too_many() {
        let err = BackendPool::with_count(MAX_NUM_BACKENDS + 1).unwrap_err();
        assert!(matches!(err, RegistryError::TooManyBackends { max: MAX_NUM_BACKENDS, .. }));
        assert!(BackendPool::with_count(MAX_NUM_BACKENDS).is_ok());
    }

    #[test]
    fn test_registry_access() {
        let pool = BackendPool::with_count(3).unwrap();
        pool.set_status(1, BackendStatus::Down);
        assert_eq!(pool.status(1), BackendStatus::Down);
        assert_eq!(pool.available_count(), 2);

        // Out of range reads as unused, writes are ignored.
        assert_eq!(pool.status(3), BackendStatus::Unused);
        pool.set_status(3, BackendStatus::Down);
        assert_eq!(pool.num_backends(), 3);
    }
}
