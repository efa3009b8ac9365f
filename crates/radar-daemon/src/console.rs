//! Terminal display collaborators
//!
//! Markers and detail updates go to the log; the warning panel is printed
//! to stdout so the operator sees it regardless of the log filter.

use std::io::Write;

use radar_compliance::{
    AlertPanel, ComplianceStatus, FlightDetail, FlightDetailView, MapRenderer, MarkerState,
};
use tracing::{debug, info, warn};

/// Operator console on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }
}

fn count(markers: &[MarkerState], status: ComplianceStatus) -> usize {
    markers.iter().filter(|m| m.status == status).count()
}

impl MapRenderer for TerminalConsole {
    fn render(&self, markers: &[MarkerState]) {
        info!(
            flights = markers.len(),
            processing = count(markers, ComplianceStatus::Processing),
            warning = count(markers, ComplianceStatus::Warning),
            "Map updated"
        );
        for marker in markers {
            debug!(
                icao = %marker.icao,
                callsign = marker.callsign.as_deref().unwrap_or("---"),
                icon = %marker.icon_key(),
                positioned = marker.position.is_some(),
                "Marker"
            );
        }
    }

    fn clear(&self) {
        info!("Map cleared");
    }
}

impl AlertPanel for TerminalConsole {
    fn show(&self, message: &str) {
        warn!("Warning panel opened");
        println!("\n==== WARNING ====\n{}\n==== type `ack` to dismiss ====\n", message);
    }

    fn hide(&self) {
        info!("Warning panel dismissed");
    }

    fn play_cue(&self) {
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            debug!(error = %e, "Audio cue failed");
        }
    }
}

impl FlightDetailView for TerminalConsole {
    fn show(&self, detail: &FlightDetail) {
        info!(
            icao = %detail.icao,
            callsign = detail.callsign.as_deref().unwrap_or("---"),
            altitude = ?detail.altitude,
            ground_speed = ?detail.ground_speed,
            track = ?detail.track,
            controller = detail.controller.as_deref().unwrap_or("none"),
            "Flight detail"
        );
        for parameter in &detail.parameters {
            info!(
                icao = %detail.icao,
                parameter = %parameter.parameter,
                requested = %parameter.parameter.describe_value(parameter.requested),
                valid = parameter.valid,
                due = ?parameter.due,
                status = %parameter.status,
                "Directive"
            );
        }
    }

    fn hide(&self) {
        debug!("Flight detail hidden");
    }
}
