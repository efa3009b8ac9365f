//! Radar daemon - directive-compliance monitoring for controlled flights
//!
//! The radar daemon provides:
//! - Periodic evaluation of flights against their directives
//! - Warning alerts for overdue directives, deduplicated per flight and parameter
//! - Operator commands on stdin (`ack`, `spectate <icao>`, `clear`)

use std::path::PathBuf;

use clap::Parser;
use radar_daemon::{Daemon, DaemonConfig, DaemonError, DaemonResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Radar daemon CLI
#[derive(Parser)]
#[command(name = "radard")]
#[command(about = "Radar daemon - flight directive-compliance monitor", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RADAR_CONFIG")]
    config: Option<String>,

    /// Flights snapshot document, re-read on every tick
    #[arg(short, long, env = "RADAR_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Operator subject id
    #[arg(long, env = "RADAR_SUBJECT")]
    subject: Option<String>,

    /// Role granted to the operator (repeatable)
    #[arg(long = "role")]
    roles: Vec<String>,

    /// Role that confers the admin capability
    #[arg(long, env = "RADAR_ADMIN_ROLE")]
    admin_role: Option<String>,

    /// Seconds between snapshot fetches
    #[arg(long, env = "RADAR_POLL_INTERVAL")]
    poll_interval: Option<u64>,

    /// Seconds a warning stays remembered after first detection
    #[arg(long, env = "RADAR_WARNING_TTL")]
    warning_ttl: Option<u64>,

    /// Log level
    #[arg(long, env = "RADAR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "RADAR_LOG_JSON")]
    json: bool,

    /// Enable audio cues before the first operator input
    #[arg(long)]
    interacted: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(snapshot) = cli.snapshot {
        config.source.snapshot_path = snapshot;
    }
    if let Some(subject) = cli.subject {
        config.identity.subject = subject;
    }
    if !cli.roles.is_empty() {
        config.identity.roles = cli.roles;
    }
    if cli.admin_role.is_some() {
        config.identity.admin_role = cli.admin_role;
    }
    if let Some(secs) = cli.poll_interval {
        config.monitor.poll_interval_secs = secs;
    }
    if let Some(secs) = cli.warning_ttl {
        config.monitor.warning_ttl_secs = secs;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;
    config.identity.interacted |= cli.interacted;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    println!(
        r#"
  radard {}
  Snapshot: {}
  Operator: {}
  Poll: {}s  Warning TTL: {}s
  Commands: ack | spectate <icao> | clear
"#,
        env!("CARGO_PKG_VERSION"),
        config.source.snapshot_path.display(),
        config.identity.subject,
        config.monitor.poll_interval_secs,
        config.monitor.warning_ttl_secs,
    );

    let daemon = Daemon::new(config)?;
    daemon.run().await
}
