//! Radar daemon library
//!
//! Hosts the compliance monitor in a terminal process:
//! - File-backed snapshot source
//! - Terminal console for markers, warnings and flight detail
//! - Operator commands from stdin
//! - Configuration and lifecycle management

pub mod config;
pub mod console;
pub mod daemon;
pub mod error;
pub mod operator;
pub mod source;

pub use config::DaemonConfig;
pub use console::TerminalConsole;
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use source::FileSnapshotSource;
