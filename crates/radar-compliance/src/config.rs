//! Monitor tunables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};

/// Configuration for the compliance monitor loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between snapshot fetches.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Seconds a surfaced warning stays remembered before it may alert again.
    #[serde(default = "default_warning_ttl")]
    pub warning_ttl_secs: u64,

    /// Upper bound for a single fetch. Defaults to the poll interval.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            warning_ttl_secs: default_warning_ttl(),
            fetch_timeout_secs: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}

fn default_warning_ttl() -> u64 {
    60
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn warning_ttl(&self) -> Duration {
        Duration::from_secs(self.warning_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.unwrap_or(self.poll_interval_secs))
    }

    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> MonitorResult<()> {
        if self.poll_interval_secs == 0 {
            return Err(MonitorError::Configuration(
                "poll interval must be at least one second".to_string(),
            ));
        }
        if self.warning_ttl_secs == 0 {
            return Err(MonitorError::Configuration(
                "warning TTL must be at least one second".to_string(),
            ));
        }
        if self.fetch_timeout_secs == Some(0) {
            return Err(MonitorError::Configuration(
                "fetch timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}
