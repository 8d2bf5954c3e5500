//! Durable state for a backend-pooling daemon: the pid file and the
//! backend status snapshot.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod persist;
pub mod registry;

pub use config::schema::PoolConfig;
pub use lifecycle::Shutdown;
pub use registry::{BackendPool, BackendRegistry, BackendStatus};
