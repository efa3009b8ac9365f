//! Display collaborators driven by the monitor.
//!
//! The monitor never renders anything itself. It hands marker states to a
//! [`MapRenderer`], consolidated warnings to an [`AlertPanel`] and the
//! spectated flight to a [`FlightDetailView`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluator::{parameter_status, ComplianceStatus, FlightEvaluation, Ownership};
use crate::flight::{Flight, FlightId, Parameter, Position};

/// Draws flight markers.
pub trait MapRenderer: Send + Sync {
    /// Replace all markers with `markers`.
    fn render(&self, markers: &[MarkerState]);

    /// Remove every marker.
    fn clear(&self);
}

/// The warning panel and its audio cue.
pub trait AlertPanel: Send + Sync {
    /// Show the panel with `message`.
    fn show(&self, message: &str);

    /// Hide the panel.
    fn hide(&self);

    /// Play the audio cue.
    fn play_cue(&self);
}

/// Detail panel for the flight the operator is spectating.
pub trait FlightDetailView: Send + Sync {
    fn show(&self, detail: &FlightDetail);
    fn hide(&self);
}

/// Per-flight marker state for the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerState {
    pub icao: FlightId,
    pub callsign: Option<String>,
    pub position: Option<Position>,
    /// Heading used to rotate the marker.
    pub heading: Option<f64>,
    pub status: ComplianceStatus,
    pub ownership: Ownership,
}

impl MarkerState {
    pub fn new(flight: &Flight, evaluation: &FlightEvaluation) -> Self {
        Self {
            icao: flight.icao.clone(),
            callsign: flight.callsign.clone(),
            position: flight.position,
            heading: flight.track,
            status: evaluation.status,
            ownership: evaluation.ownership,
        }
    }

    /// Stable icon key for the renderer.
    pub fn icon_key(&self) -> String {
        match self.ownership {
            Ownership::Unassigned => "aircraft_marker_solid".to_string(),
            Ownership::Mine => format!("aircraft_marker_my_{}", self.status),
            Ownership::Other => format!("aircraft_marker_other_{}", self.status),
        }
    }
}

/// Current directive state for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDetail {
    pub parameter: Parameter,
    pub requested: Option<f64>,
    pub valid: bool,
    pub due: Option<DateTime<Utc>>,
    pub status: ComplianceStatus,
}

/// Everything the detail panel shows for the spectated flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDetail {
    pub icao: FlightId,
    pub callsign: Option<String>,
    pub altitude: Option<f64>,
    pub ground_speed: Option<f64>,
    pub track: Option<f64>,
    pub ownership: Ownership,
    /// Who controls the flight: the operator's own subject id, or the
    /// issuer's display name for someone else's directive.
    pub controller: Option<String>,
    pub parameters: Vec<ParameterDetail>,
}

impl FlightDetail {
    pub fn new(flight: &Flight, subject: &str, now: DateTime<Utc>) -> Self {
        let (ownership, controller, parameters) = match &flight.directive {
            None => (Ownership::Unassigned, None, Vec::new()),
            Some(directive) => {
                let mine = directive.issuer == subject;
                let controller = if mine {
                    directive.issuer.clone()
                } else {
                    directive
                        .issuer_name
                        .clone()
                        .unwrap_or_else(|| directive.issuer.clone())
                };
                let parameters = Parameter::ALL
                    .iter()
                    .map(|&parameter| {
                        let pd = directive.parameter(parameter);
                        ParameterDetail {
                            parameter,
                            requested: pd.value,
                            valid: pd.valid,
                            due: pd.due,
                            status: parameter_status(pd, now),
                        }
                    })
                    .collect();
                let ownership = if mine { Ownership::Mine } else { Ownership::Other };
                (ownership, Some(controller), parameters)
            }
        };

        Self {
            icao: flight.icao.clone(),
            callsign: flight.callsign.clone(),
            altitude: flight.altitude,
            ground_speed: flight.ground_speed,
            track: flight.track,
            ownership,
            controller,
            parameters,
        }
    }
}
