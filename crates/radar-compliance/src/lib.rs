#![deny(unsafe_code)]
//! # radar-compliance
//!
//! Directive-compliance monitoring for controlled flights.
//!
//! An operator may place a flight under a directive: requested altitude,
//! ground speed and track, each with a grace deadline. The monitor polls a
//! data source on a fixed interval and, per tick:
//!
//! 1. **Evaluates** every flight ([`evaluate`]): each parameter is *ready*,
//!    *processing* (inside its grace period) or *warning* (deadline passed).
//!    Warnings become [`ViolationEvent`]s when the operator issued the
//!    directive or holds the admin capability.
//! 2. **Deduplicates** the events in [`WarningMemory`], which remembers each
//!    (flight, parameter) for a fixed TTL from first detection.
//! 3. **Dispatches** fresh warnings through the [`AlertDispatcher`], which
//!    opens the alert panel only when it is currently hidden.
//!
//! [`ComplianceMonitor`] drives the loop and owns all mutable state in a
//! [`MonitorSession`]. Rendering, identity and the data source are
//! collaborators behind traits.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use radar_compliance::{
//!     ActivationFlag, Collaborators, ComplianceMonitor, DataSource, MonitorConfig,
//!     OperatorHandle, StaticIdentity,
//! };
//! # use radar_compliance::{AlertPanel, FlightDetailView, MapRenderer};
//!
//! # async fn example(
//! #     source: Arc<dyn DataSource>,
//! #     map: Arc<dyn MapRenderer>,
//! #     panel: Arc<dyn AlertPanel>,
//! #     detail: Arc<dyn FlightDetailView>,
//! # ) -> radar_compliance::MonitorResult<()> {
//! let identity = Arc::new(
//!     StaticIdentity::new("atc-1")
//!         .with_admin_role("admin"),
//! );
//! let collaborators = Collaborators {
//!     map,
//!     panel,
//!     detail,
//!     activation: Arc::new(ActivationFlag::new(false)),
//! };
//!
//! let monitor = ComplianceMonitor::new(MonitorConfig::default(), source, identity, collaborators)?;
//! let (operator, commands) = OperatorHandle::channel(16);
//!
//! let run = tokio::spawn(monitor.run(commands, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }));
//! operator.acknowledge().await?;
//! let _session = run.await;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod evaluator;
pub mod flight;
pub mod identity;
pub mod memory;
pub mod monitor;
pub mod source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MonitorConfig;
pub use dispatcher::{compose_message, ActivationFlag, AlertDispatcher, PanelState, UserActivation};
pub use display::{AlertPanel, FlightDetail, FlightDetailView, MapRenderer, MarkerState, ParameterDetail};
pub use error::{MonitorError, MonitorResult};
pub use evaluator::{evaluate, parameter_status, ComplianceStatus, FlightEvaluation, Ownership, ViolationEvent};
pub use flight::{Directive, Flight, FlightId, Parameter, ParameterDirective, Position};
pub use identity::{AuthError, Identity, StaticIdentity};
pub use memory::{Reconciliation, WarningMemory, WarningRecord};
pub use monitor::{
    Collaborators, ComplianceMonitor, MonitorEvent, MonitorSession, OperatorCommand, OperatorHandle,
    TickOutcome,
};
pub use source::{decode_snapshot, parse_deadline, DataSource};
