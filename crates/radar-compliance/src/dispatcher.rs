//! Edge-triggered alert dispatch.
//!
//! The panel opens on a non-empty batch of fresh warnings only when it is
//! hidden. While it is visible nothing re-fires and the open message is left
//! as is; only an operator acknowledgement hides it again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::display::AlertPanel;
use crate::evaluator::ViolationEvent;

/// Whether the host has seen the operator interact yet. Audio cues are
/// only allowed after the first interaction.
pub trait UserActivation: Send + Sync {
    fn has_interacted(&self) -> bool;
}

/// Settable activation flag.
#[derive(Debug, Default)]
pub struct ActivationFlag(AtomicBool);

impl ActivationFlag {
    pub fn new(interacted: bool) -> Self {
        Self(AtomicBool::new(interacted))
    }

    /// Record that the operator interacted with the console.
    pub fn mark_interacted(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl UserActivation for ActivationFlag {
    fn has_interacted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Visibility of the warning panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Hidden,
    Visible {
        message: String,
        opened_at: DateTime<Utc>,
    },
}

impl PanelState {
    pub fn is_visible(&self) -> bool {
        matches!(self, PanelState::Visible { .. })
    }
}

/// Build the consolidated warning text for a batch of fresh violations.
pub fn compose_message(events: &[ViolationEvent]) -> String {
    let mut message = String::from("The following warnings are available:\n");
    for event in events {
        message.push_str(&format!(
            "\nFlight {} ({}) is not at requested {} at {}",
            event.callsign.as_deref().unwrap_or("---"),
            event.icao,
            event.parameter,
            event.requested
        ));
    }
    message
}

/// Opens the alert panel for fresh warnings.
pub struct AlertDispatcher {
    panel: Arc<dyn AlertPanel>,
    activation: Arc<dyn UserActivation>,
}

impl AlertDispatcher {
    pub fn new(panel: Arc<dyn AlertPanel>, activation: Arc<dyn UserActivation>) -> Self {
        Self { panel, activation }
    }

    /// Fire if `fresh` is non-empty and the panel is hidden.
    ///
    /// Returns `true` when the panel was opened.
    pub fn dispatch(&self, state: &mut PanelState, fresh: &[ViolationEvent], now: DateTime<Utc>) -> bool {
        if fresh.is_empty() {
            return false;
        }
        if state.is_visible() {
            debug!(suppressed = fresh.len(), "Alert panel already open");
            return false;
        }

        let message = compose_message(fresh);
        if self.activation.has_interacted() {
            self.panel.play_cue();
        }
        self.panel.show(&message);
        info!(warnings = fresh.len(), "Alert raised");

        *state = PanelState::Visible {
            message,
            opened_at: now,
        };
        true
    }

    /// Operator acknowledgement. Returns `true` if the panel was open.
    pub fn acknowledge(&self, state: &mut PanelState) -> bool {
        let PanelState::Visible { opened_at, .. } = state else {
            return false;
        };
        info!(opened_at = %opened_at, "Alert acknowledged");
        self.panel.hide();
        *state = PanelState::Hidden;
        true
    }
}
