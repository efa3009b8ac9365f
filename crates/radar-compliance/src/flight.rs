//! Flight and directive data model.
//!
//! A [`Flight`] is replaced wholesale on every snapshot; only its
//! [`FlightId`] (the ICAO address) carries identity across ticks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ICAO 24-bit address identifying a monitored flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(String);

impl FlightId {
    pub fn new(icao: impl Into<String>) -> Self {
        Self(icao.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ICAO addresses are hex; letter case carries no meaning.
    pub fn matches(&self, other: &FlightId) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::fmt::Display for FlightId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlightId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One of the three independently tracked directive dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Altitude,
    GroundSpeed,
    Track,
}

impl Parameter {
    /// All parameters in evaluation order.
    pub const ALL: [Parameter; 3] = [Parameter::Altitude, Parameter::GroundSpeed, Parameter::Track];

    /// Human-readable requested value, e.g. `"12000 feet"` or `"270°"`.
    pub fn describe_value(&self, value: Option<f64>) -> String {
        let Some(value) = value else {
            return "---".to_string();
        };
        match self {
            Parameter::Altitude => format!("{} feet", value),
            Parameter::GroundSpeed => format!("{} knots", value),
            Parameter::Track => format!("{}°", value),
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parameter::Altitude => write!(f, "altitude"),
            Parameter::GroundSpeed => write!(f, "ground speed"),
            Parameter::Track => write!(f, "track"),
        }
    }
}

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Operator instruction for a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDirective {
    /// Requested value, if the operator set one.
    pub value: Option<f64>,

    /// `true` once the flight complies (or the instruction was acknowledged).
    pub valid: bool,

    /// Grace deadline. Only meaningful while `valid` is false; `None` means
    /// the deadline was missing or could not be parsed and is never due.
    pub due: Option<DateTime<Utc>>,
}

impl ParameterDirective {
    /// A directive the flight already complies with.
    pub fn compliant(value: Option<f64>) -> Self {
        Self {
            value,
            valid: true,
            due: None,
        }
    }

    /// A directive awaiting compliance until `due`.
    pub fn pending(value: f64, due: DateTime<Utc>) -> Self {
        Self {
            value: Some(value),
            valid: false,
            due: Some(due),
        }
    }
}

/// Instruction bundle issued by one operator for one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    /// Subject id of the issuing operator.
    pub issuer: String,

    /// Display name of the issuing operator.
    pub issuer_name: Option<String>,

    pub altitude: ParameterDirective,
    pub ground_speed: ParameterDirective,
    pub track: ParameterDirective,
}

impl Directive {
    /// Directive for a given parameter.
    pub fn parameter(&self, parameter: Parameter) -> &ParameterDirective {
        match parameter {
            Parameter::Altitude => &self.altitude,
            Parameter::GroundSpeed => &self.ground_speed,
            Parameter::Track => &self.track,
        }
    }
}

/// A monitored flight as reported by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub icao: FlightId,
    pub callsign: Option<String>,
    pub position: Option<Position>,
    pub altitude: Option<f64>,
    pub ground_speed: Option<f64>,
    pub track: Option<f64>,
    pub directive: Option<Directive>,
}

impl Flight {
    /// A flight with no observations and no directive.
    pub fn new(icao: impl Into<FlightId>) -> Self {
        Self {
            icao: icao.into(),
            callsign: None,
            position: None,
            altitude: None,
            ground_speed: None,
            track: None,
            directive: None,
        }
    }

    pub fn with_callsign(mut self, callsign: impl Into<String>) -> Self {
        self.callsign = Some(callsign.into());
        self
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directive = Some(directive);
        self
    }

    /// Callsign if known, otherwise the ICAO address.
    pub fn label(&self) -> &str {
        self.callsign.as_deref().unwrap_or(self.icao.as_str())
    }
}
