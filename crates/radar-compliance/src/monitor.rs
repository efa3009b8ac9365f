//! Orchestration loop.
//!
//! On every tick the monitor fetches one snapshot, evaluates each flight,
//! reconciles the violations against warning memory and, if anything fresh
//! surfaced, hands the batch to the alert dispatcher. Ticks never overlap:
//! the loop awaits each one to completion and a fetch that outlives its
//! timeout is dropped along with its response.
//!
//! All mutable state lives in [`MonitorSession`], owned by the monitor.
//! Operator actions reach it through [`OperatorHandle`] and are applied by
//! the loop between ticks.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::dispatcher::{AlertDispatcher, PanelState, UserActivation};
use crate::display::{AlertPanel, FlightDetail, FlightDetailView, MapRenderer, MarkerState};
use crate::error::{MonitorError, MonitorResult};
use crate::evaluator::{evaluate, ViolationEvent};
use crate::flight::{Flight, FlightId};
use crate::identity::Identity;
use crate::memory::WarningMemory;
use crate::source::DataSource;

/// Events emitted by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A snapshot was evaluated.
    TickCompleted {
        flights: usize,
        violations: usize,
        new_warnings: usize,
    },

    /// The snapshot could not be fetched; display was cleared.
    SnapshotUnavailable { reason: String },

    /// The alert panel was opened.
    AlertRaised { warnings: Vec<ViolationEvent> },

    /// The operator acknowledged the open alert.
    AlertAcknowledged,
}

/// Actions the operator can take while the loop runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Dismiss the warning panel.
    Acknowledge,
    /// Follow a flight in the detail panel.
    Spectate(FlightId),
    /// Stop following the current flight.
    ClearSpectate,
}

/// Sending half for operator commands.
#[derive(Debug, Clone)]
pub struct OperatorHandle {
    tx: mpsc::Sender<OperatorCommand>,
}

impl OperatorHandle {
    /// Create a handle and the receiver to pass to [`ComplianceMonitor::run`].
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<OperatorCommand>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    pub async fn send(&self, command: OperatorCommand) -> MonitorResult<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| MonitorError::Configuration("monitor loop has stopped".to_string()))
    }

    /// Send from a thread outside the runtime. Panics if called from async code.
    pub fn blocking_send(&self, command: OperatorCommand) -> MonitorResult<()> {
        self.tx
            .blocking_send(command)
            .map_err(|_| MonitorError::Configuration("monitor loop has stopped".to_string()))
    }

    pub async fn acknowledge(&self) -> MonitorResult<()> {
        self.send(OperatorCommand::Acknowledge).await
    }

    pub async fn spectate(&self, icao: impl Into<FlightId>) -> MonitorResult<()> {
        self.send(OperatorCommand::Spectate(icao.into())).await
    }
}

/// Process-local state owned by the loop. Nothing survives a restart.
#[derive(Debug, Clone)]
pub struct MonitorSession {
    pub memory: WarningMemory,
    pub panel: PanelState,
    pub spectated: Option<FlightId>,
    /// Flights from the last successful fetch.
    pub snapshot: Vec<Flight>,
}

impl MonitorSession {
    pub fn new(warning_ttl: ChronoDuration) -> Self {
        Self {
            memory: WarningMemory::new(warning_ttl),
            panel: PanelState::Hidden,
            spectated: None,
            snapshot: Vec::new(),
        }
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Evaluated {
        markers: Vec<MarkerState>,
        violations: usize,
        fresh: Vec<ViolationEvent>,
        alerted: bool,
    },
    Skipped {
        reason: String,
    },
}

/// Display and host collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub map: Arc<dyn MapRenderer>,
    pub panel: Arc<dyn AlertPanel>,
    pub detail: Arc<dyn FlightDetailView>,
    pub activation: Arc<dyn UserActivation>,
}

/// Directive-compliance monitor.
pub struct ComplianceMonitor {
    config: MonitorConfig,
    source: Arc<dyn DataSource>,
    identity: Arc<dyn Identity>,
    clock: Arc<dyn Clock>,
    map: Arc<dyn MapRenderer>,
    detail: Arc<dyn FlightDetailView>,
    dispatcher: AlertDispatcher,
    session: MonitorSession,
    event_tx: broadcast::Sender<MonitorEvent>,
}

impl ComplianceMonitor {
    /// Create a monitor with an empty session.
    pub fn new(
        config: MonitorConfig,
        source: Arc<dyn DataSource>,
        identity: Arc<dyn Identity>,
        collaborators: Collaborators,
    ) -> MonitorResult<Self> {
        config.validate()?;
        let ttl = ChronoDuration::from_std(config.warning_ttl())
            .map_err(|e| MonitorError::Configuration(format!("warning TTL out of range: {}", e)))?;
        let (event_tx, _) = broadcast::channel(256);

        Ok(Self {
            config,
            source,
            identity,
            clock: Arc::new(SystemClock),
            map: collaborators.map,
            detail: collaborators.detail,
            dispatcher: AlertDispatcher::new(collaborators.panel, collaborators.activation),
            session: MonitorSession::new(ttl),
            event_tx,
        })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Subscribe to monitor events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    pub fn session(&self) -> &MonitorSession {
        &self.session
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Fetch one snapshot and process it.
    #[instrument(skip(self))]
    pub async fn tick(&mut self) -> TickOutcome {
        let timeout = self.config.fetch_timeout();
        let fetched = match tokio::time::timeout(timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(MonitorError::FetchTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        };

        match fetched {
            Ok(flights) => self.apply_snapshot(flights),
            Err(e) => self.handle_fetch_failure(e),
        }
    }

    /// Process an already fetched snapshot.
    pub fn apply_snapshot(&mut self, flights: Vec<Flight>) -> TickOutcome {
        let now = self.clock.now();

        let mut markers = Vec::with_capacity(flights.len());
        let mut violations = Vec::new();
        for flight in &flights {
            let evaluation = evaluate(flight, self.identity.as_ref(), now);
            markers.push(MarkerState::new(flight, &evaluation));
            violations.extend(evaluation.violations);
        }
        self.map.render(&markers);

        self.session.snapshot = flights;
        self.refresh_detail(now);

        let violation_count = violations.len();
        let reconciliation = self.session.memory.reconcile(violations, now);
        let fresh = reconciliation.fresh;

        let alerted = self
            .dispatcher
            .dispatch(&mut self.session.panel, &fresh, now);
        if alerted {
            let _ = self.event_tx.send(MonitorEvent::AlertRaised {
                warnings: fresh.clone(),
            });
        }

        debug!(
            flights = markers.len(),
            violations = violation_count,
            fresh = fresh.len(),
            alerted,
            "Tick evaluated"
        );
        let _ = self.event_tx.send(MonitorEvent::TickCompleted {
            flights: markers.len(),
            violations: violation_count,
            new_warnings: fresh.len(),
        });

        TickOutcome::Evaluated {
            markers,
            violations: violation_count,
            fresh,
            alerted,
        }
    }

    /// Clear display state after a failed fetch. Warning memory and the
    /// alert panel are left as they are.
    fn handle_fetch_failure(&mut self, error: MonitorError) -> TickOutcome {
        warn!(error = %error, "Snapshot unavailable, clearing display");

        self.map.clear();
        self.detail.hide();
        self.session.spectated = None;
        self.session.snapshot.clear();

        let reason = error.to_string();
        let _ = self.event_tx.send(MonitorEvent::SnapshotUnavailable {
            reason: reason.clone(),
        });
        TickOutcome::Skipped { reason }
    }

    /// Publish the spectated flight, or drop it if it left the snapshot.
    fn refresh_detail(&mut self, now: DateTime<Utc>) {
        let Some(icao) = self.session.spectated.clone() else {
            return;
        };
        match self.session.snapshot.iter().find(|f| f.icao.matches(&icao)) {
            Some(flight) => {
                let detail = FlightDetail::new(flight, self.identity.subject(), now);
                self.detail.show(&detail);
            }
            None => {
                debug!(icao = %icao, "Spectated flight left the snapshot");
                self.detail.hide();
                self.session.spectated = None;
            }
        }
    }

    /// Apply an operator command.
    pub fn apply_command(&mut self, command: OperatorCommand) {
        match command {
            OperatorCommand::Acknowledge => {
                if self.dispatcher.acknowledge(&mut self.session.panel) {
                    let _ = self.event_tx.send(MonitorEvent::AlertAcknowledged);
                }
            }
            OperatorCommand::Spectate(icao) => {
                let known = self
                    .session
                    .snapshot
                    .iter()
                    .find(|f| f.icao.matches(&icao))
                    .map(|f| f.icao.clone());
                if let Some(icao) = known {
                    info!(icao = %icao, "Spectating flight");
                    self.session.spectated = Some(icao);
                    self.refresh_detail(self.clock.now());
                } else {
                    debug!(icao = %icao, "Cannot spectate unknown flight");
                }
            }
            OperatorCommand::ClearSpectate => {
                if self.session.spectated.take().is_some() {
                    self.detail.hide();
                }
            }
        }
    }

    /// Run until `shutdown` resolves, returning the final session.
    pub async fn run<F>(mut self, mut commands: mpsc::Receiver<OperatorCommand>, shutdown: F) -> MonitorSession
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            poll_interval_secs = self.config.poll_interval_secs,
            warning_ttl_secs = self.config.warning_ttl_secs,
            subject = %self.identity.subject(),
            "Compliance monitor started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
                Some(command) = commands.recv() => self.apply_command(command),
            }
        }

        info!("Compliance monitor stopped");
        self.session
    }
}
