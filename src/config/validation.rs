//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Keep the backend count within the fixed snapshot width
//! - Reject empty paths and duplicate backend names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PoolConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;
use crate::config::schema::PoolConfig;
use crate::persist::MAX_NUM_BACKENDS;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &PoolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.pid_file_name.as_os_str().is_empty() {
        errors.push(ValidationError::new("pid_file_name", "must not be empty"));
    }
    if config.logdir.as_os_str().is_empty() {
        errors.push(ValidationError::new("logdir", "must not be empty"));
    }

    if config.backends.len() > MAX_NUM_BACKENDS {
        errors.push(ValidationError::new(
            "backends",
            format!(
                "{} backends configured, at most {} are supported",
                config.backends.len(),
                MAX_NUM_BACKENDS
            ),
        ));
    }

    let mut seen = HashSet::new();
    for (i, backend) in config.backends.iter().enumerate() {
        if backend.name.is_empty() {
            errors.push(ValidationError::new(format!("backends[{}].name", i), "must not be empty"));
        } else if !seen.insert(backend.name.as_str()) {
            errors.push(ValidationError::new(
                format!("backends[{}].name", i),
                format!("duplicate backend name '{}'", backend.name),
            ));
        }
    }

    if config.logging.level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "logging.level",
            format!("unknown level '{}'", config.logging.level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
