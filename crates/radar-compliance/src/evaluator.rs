//! Compliance evaluation for a single flight.
//!
//! Classifies each directive parameter as ready, processing or warning and
//! emits a [`ViolationEvent`] for every warning the current operator is
//! authorized to see. Evaluation is pure: it reads the flight, the identity
//! and the given instant, nothing else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flight::{Flight, FlightId, Parameter, ParameterDirective};
use crate::identity::Identity;

/// Compliance classification, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Compliant, acknowledged, or no directive at all.
    Ready,
    /// Not yet compliant, still inside the grace period.
    Processing,
    /// Not compliant and the grace deadline has passed.
    Warning,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceStatus::Ready => write!(f, "ready"),
            ComplianceStatus::Processing => write!(f, "processing"),
            ComplianceStatus::Warning => write!(f, "warning"),
        }
    }
}

/// Who issued the directive, relative to the current operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Mine,
    Other,
    #[serde(rename = "none")]
    Unassigned,
}

impl std::fmt::Display for Ownership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ownership::Mine => write!(f, "mine"),
            Ownership::Other => write!(f, "other"),
            Ownership::Unassigned => write!(f, "none"),
        }
    }
}

/// A parameter found out of compliance past its deadline during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationEvent {
    pub icao: FlightId,
    pub callsign: Option<String>,
    pub parameter: Parameter,
    /// Human-readable requested value, e.g. `"12000 feet"`.
    pub requested: String,
    pub detected_at: DateTime<Utc>,
}

/// Outcome of evaluating one flight.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightEvaluation {
    pub icao: FlightId,
    /// Worst status over all parameters.
    pub status: ComplianceStatus,
    pub ownership: Ownership,
    /// Status of each parameter, in [`Parameter::ALL`] order.
    pub parameters: [(Parameter, ComplianceStatus); 3],
    pub violations: Vec<ViolationEvent>,
}

/// Status of a single parameter directive at `now`.
///
/// A directive without a usable deadline never becomes due.
pub fn parameter_status(directive: &ParameterDirective, now: DateTime<Utc>) -> ComplianceStatus {
    if directive.valid {
        return ComplianceStatus::Ready;
    }
    match directive.due {
        Some(due) if now > due => ComplianceStatus::Warning,
        _ => ComplianceStatus::Processing,
    }
}

/// Evaluate one flight on behalf of `identity`.
pub fn evaluate(flight: &Flight, identity: &dyn Identity, now: DateTime<Utc>) -> FlightEvaluation {
    let Some(directive) = &flight.directive else {
        return FlightEvaluation {
            icao: flight.icao.clone(),
            status: ComplianceStatus::Ready,
            ownership: Ownership::Unassigned,
            parameters: Parameter::ALL.map(|p| (p, ComplianceStatus::Ready)),
            violations: Vec::new(),
        };
    };

    let ownership = if directive.issuer == identity.subject() {
        Ownership::Mine
    } else {
        Ownership::Other
    };

    let parameters = Parameter::ALL.map(|p| (p, parameter_status(directive.parameter(p), now)));
    let status = parameters
        .iter()
        .map(|(_, s)| *s)
        .max()
        .unwrap_or(ComplianceStatus::Ready);

    let mut violations = Vec::new();
    if status == ComplianceStatus::Warning && identity.may_see_violations_of(&directive.issuer) {
        for (parameter, parameter_status) in parameters {
            if parameter_status != ComplianceStatus::Warning {
                continue;
            }
            violations.push(ViolationEvent {
                icao: flight.icao.clone(),
                callsign: flight.callsign.clone(),
                parameter,
                requested: parameter.describe_value(directive.parameter(parameter).value),
                detected_at: now,
            });
        }
    }

    FlightEvaluation {
        icao: flight.icao.clone(),
        status,
        ownership,
        parameters,
        violations,
    }
}
