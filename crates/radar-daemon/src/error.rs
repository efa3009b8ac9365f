//! Error types for radard

use radar_compliance::MonitorError;
use thiserror::Error;

/// Daemon errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Monitor setup error
    #[error("monitor error: {0}")]
    Monitor(#[from] MonitorError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for DaemonError {
    fn from(e: config::ConfigError) -> Self {
        DaemonError::Config(e.to_string())
    }
}

/// Result type for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
