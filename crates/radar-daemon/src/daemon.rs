//! Daemon setup and lifecycle management

use std::future::Future;
use std::sync::Arc;

use radar_compliance::{
    ActivationFlag, Collaborators, ComplianceMonitor, MonitorEvent, MonitorSession, OperatorCommand,
    OperatorHandle,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::DaemonConfig;
use crate::console::TerminalConsole;
use crate::error::DaemonResult;
use crate::operator::spawn_console_input;
use crate::source::FileSnapshotSource;

/// Radar compliance daemon
pub struct Daemon {
    config: DaemonConfig,
    monitor: ComplianceMonitor,
    activation: Arc<ActivationFlag>,
}

impl Daemon {
    /// Create a new daemon with the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let console = Arc::new(TerminalConsole::new());
        let activation = Arc::new(ActivationFlag::new(config.identity.interacted));
        let source = Arc::new(FileSnapshotSource::new(config.source.snapshot_path.clone()));
        let identity = Arc::new(config.identity.to_identity());
        if config.identity.admin_role.is_none() {
            info!("No admin role configured; only the operator's own directives raise alerts");
        }

        let monitor = ComplianceMonitor::new(
            config.monitor.clone(),
            source,
            identity,
            Collaborators {
                map: console.clone(),
                panel: console.clone(),
                detail: console,
                activation: activation.clone(),
            },
        )?;

        Ok(Self {
            config,
            monitor,
            activation,
        })
    }

    /// Run until a shutdown signal arrives, taking operator commands from stdin
    pub async fn run(self) -> DaemonResult<()> {
        let (operator, commands) = OperatorHandle::channel(32);
        spawn_console_input(operator, self.activation.clone())?;
        self.run_until(commands, shutdown_signal()).await.map(|_| ())
    }

    /// Run until `shutdown` resolves, returning the final session
    pub async fn run_until<F>(
        self,
        commands: mpsc::Receiver<OperatorCommand>,
        shutdown: F,
    ) -> DaemonResult<MonitorSession>
    where
        F: Future<Output = ()>,
    {
        info!(
            snapshot = %self.config.source.snapshot_path.display(),
            subject = %self.config.identity.subject,
            "Radar daemon starting"
        );

        let events = tokio::spawn(log_events(self.monitor.subscribe(), self.config.logging.json));

        let session = self.monitor.run(commands, shutdown).await;

        events.abort();

        info!(
            remembered_warnings = session.memory.len(),
            panel_open = session.panel.is_visible(),
            "Radar daemon shutting down"
        );

        Ok(session)
    }
}

async fn log_events(mut events: broadcast::Receiver<MonitorEvent>, json: bool) {
    loop {
        match events.recv().await {
            Ok(event) if json => match serde_json::to_string(&event) {
                Ok(line) => info!(target: "radar::events", event = %line),
                Err(e) => warn!(error = %e, "Failed to encode monitor event"),
            },
            Ok(event) => debug!(target: "radar::events", event = ?event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "Event log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
