//! Configuration for radard

use std::path::PathBuf;

use radar_compliance::{MonitorConfig, StaticIdentity};
use serde::{Deserialize, Serialize};

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Monitor tunables
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Snapshot source
    #[serde(default)]
    pub source: SourceConfig,

    /// Operator identity
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where snapshots are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path of the flights document, re-read on every tick
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

/// Operator identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Subject id compared against directive issuers
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Roles granted to the operator
    #[serde(default)]
    pub roles: Vec<String>,

    /// Role that confers the admin capability
    #[serde(default)]
    pub admin_role: Option<String>,

    /// Treat the operator as having interacted already, enabling audio cues
    /// from the first alert
    #[serde(default)]
    pub interacted: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            roles: Vec::new(),
            admin_role: None,
            interacted: false,
        }
    }
}

impl IdentityConfig {
    /// Resolve into a monitor identity.
    pub fn to_identity(&self) -> StaticIdentity {
        let mut identity = StaticIdentity::new(self.subject.clone());
        if let Some(admin_role) = &self.admin_role {
            identity = identity.with_admin_role(admin_role.clone());
        }
        self.roles
            .iter()
            .fold(identity, |identity, role| identity.with_role(role.clone()))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("flights.json")
}

fn default_subject() -> String {
    "operator".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then the optional file, then `RADAR_`
    /// environment variables (`RADAR_MONITOR__POLL_INTERVAL_SECS=2`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RADAR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
