//! Data source boundary and snapshot decoding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::error::{MonitorError, MonitorResult};
use crate::flight::{Directive, Flight, FlightId, ParameterDirective, Position};

/// Supplies one snapshot of all flights per call.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self) -> MonitorResult<Vec<Flight>>;
}

/// Parse a deadline timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`) and RFC 2822 / HTTP dates
/// (`Wed, 01 May 2024 12:00:00 GMT`). Anything else is rejected.
pub fn parse_deadline(raw: &str) -> MonitorResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_rfc2822(trimmed))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MonitorError::InvalidDeadline {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    flights: Vec<WireFlight>,
}

#[derive(Debug, Deserialize)]
struct WireFlight {
    icao: String,
    #[serde(default)]
    callsign: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    altitude: Option<f64>,
    #[serde(default)]
    ground_speed: Option<f64>,
    #[serde(default)]
    track: Option<f64>,
    #[serde(default)]
    instructions: Option<WireInstructions>,
}

#[derive(Debug, Deserialize)]
struct WireInstructions {
    atc_user_id: String,
    #[serde(default)]
    atc_user_fullname: Option<String>,
    #[serde(default)]
    altitude: Option<f64>,
    #[serde(default)]
    altitude_valid: Option<bool>,
    #[serde(default)]
    altitude_due: Option<String>,
    #[serde(default)]
    ground_speed: Option<f64>,
    #[serde(default)]
    ground_speed_valid: Option<bool>,
    #[serde(default)]
    ground_speed_due: Option<String>,
    #[serde(default)]
    track: Option<f64>,
    #[serde(default)]
    track_valid: Option<bool>,
    #[serde(default)]
    track_due: Option<String>,
}

fn parameter_directive(
    icao: &str,
    field: &str,
    value: Option<f64>,
    valid: Option<bool>,
    due: Option<String>,
) -> ParameterDirective {
    // Only an explicit `false` marks a parameter as awaiting compliance.
    let valid = valid != Some(false);
    let due = match due {
        Some(raw) if !valid => match parse_deadline(&raw) {
            Ok(due) => Some(due),
            Err(e) => {
                warn!(icao = %icao, field = %field, error = %e, "Unparseable deadline, treating as never due");
                None
            }
        },
        Some(raw) => parse_deadline(&raw).ok(),
        None => None,
    };
    ParameterDirective { value, valid, due }
}

impl From<WireFlight> for Flight {
    fn from(wire: WireFlight) -> Self {
        let position = match (wire.latitude, wire.longitude) {
            (Some(latitude), Some(longitude)) => Some(Position {
                latitude,
                longitude,
            }),
            _ => None,
        };

        let directive = wire.instructions.map(|i| Directive {
            altitude: parameter_directive(&wire.icao, "altitude_due", i.altitude, i.altitude_valid, i.altitude_due),
            ground_speed: parameter_directive(
                &wire.icao,
                "ground_speed_due",
                i.ground_speed,
                i.ground_speed_valid,
                i.ground_speed_due,
            ),
            track: parameter_directive(&wire.icao, "track_due", i.track, i.track_valid, i.track_due),
            issuer: i.atc_user_id,
            issuer_name: i.atc_user_fullname,
        });

        Flight {
            icao: FlightId::new(wire.icao),
            callsign: wire.callsign,
            position,
            altitude: wire.altitude,
            ground_speed: wire.ground_speed,
            track: wire.track,
            directive,
        }
    }
}

/// Decode a `{"flights": [...]}` snapshot document.
pub fn decode_snapshot(bytes: &[u8]) -> MonitorResult<Vec<Flight>> {
    let document: SnapshotDocument = serde_json::from_slice(bytes)
        .map_err(|e| MonitorError::MalformedSnapshot(e.to_string()))?;
    Ok(document.flights.into_iter().map(Flight::from).collect())
}
