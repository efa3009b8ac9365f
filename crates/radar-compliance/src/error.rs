//! Error types for the compliance monitor.
//!
//! None of these are fatal to the host: the monitor degrades every failure
//! to "no violation reported" and keeps ticking.

use thiserror::Error;

/// Errors raised while fetching, decoding or configuring the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The data source could not be reached or read.
    #[error("data source unavailable: {0}")]
    SourceUnavailable(String),

    /// The data source answered with something that is not a flight snapshot.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// The fetch did not complete within the allotted time.
    #[error("snapshot fetch timed out after {timeout_ms}ms")]
    FetchTimeout { timeout_ms: u64 },

    /// A deadline timestamp could not be parsed.
    #[error("invalid deadline {value:?}: {reason}")]
    InvalidDeadline { value: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
