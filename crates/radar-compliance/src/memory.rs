//! TTL-bounded memory of surfaced warnings.
//!
//! Holds at most one [`WarningRecord`] per (flight, parameter). A record's
//! `first_seen` is fixed when it is created; repeat sightings refresh only
//! its label and requested value. A persistent violation therefore surfaces
//! again once per TTL window measured from its first detection.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluator::ViolationEvent;
use crate::flight::{FlightId, Parameter};

/// A remembered warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningRecord {
    pub icao: FlightId,
    pub callsign: Option<String>,
    pub parameter: Parameter,
    pub requested: String,
    pub first_seen: DateTime<Utc>,
}

impl WarningRecord {
    fn from_event(event: &ViolationEvent, now: DateTime<Utc>) -> Self {
        Self {
            icao: event.icao.clone(),
            callsign: event.callsign.clone(),
            parameter: event.parameter,
            requested: event.requested.clone(),
            first_seen: now,
        }
    }

    /// Time elapsed since the record was created.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.first_seen
    }
}

/// Result of reconciling one tick's violations against memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Violations not previously remembered, in input order.
    pub fresh: Vec<ViolationEvent>,
    /// Number of violations suppressed as already known.
    pub known: usize,
    /// Number of records dropped by the TTL prune.
    pub expired: usize,
}

type WarningKey = (FlightId, Parameter);

/// Deduplicating store of surfaced warnings.
#[derive(Debug, Clone)]
pub struct WarningMemory {
    ttl: Duration,
    records: HashMap<WarningKey, (u64, WarningRecord)>,
    next_seq: u64,
}

impl WarningMemory {
    /// Create an empty memory with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            records: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record for a (flight, parameter) pair.
    pub fn get(&self, icao: &FlightId, parameter: Parameter) -> Option<&WarningRecord> {
        self.records
            .get(&(icao.clone(), parameter))
            .map(|(_, record)| record)
    }

    /// All records in insertion order.
    pub fn records(&self) -> Vec<&WarningRecord> {
        let mut entries: Vec<_> = self.records.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, record)| record).collect()
    }

    /// Drop every record whose age has reached the TTL.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        let ttl = self.ttl;
        self.records.retain(|_, (_, record)| record.age(now) < ttl);
        before - self.records.len()
    }

    /// Prune, then split `events` into already-known and fresh violations.
    ///
    /// Known violations update the remembered label and requested value.
    /// Fresh violations are remembered with `first_seen = now`.
    pub fn reconcile(&mut self, events: Vec<ViolationEvent>, now: DateTime<Utc>) -> Reconciliation {
        let expired = self.prune(now);
        let mut outcome = Reconciliation {
            expired,
            ..Default::default()
        };

        for event in events {
            if let Some(callsign) = &event.callsign {
                for parameter in Parameter::ALL {
                    if let Some((_, record)) =
                        self.records.get_mut(&(event.icao.clone(), parameter))
                    {
                        record.callsign = Some(callsign.clone());
                    }
                }
            }

            let key = (event.icao.clone(), event.parameter);
            if let Some((_, record)) = self.records.get_mut(&key) {
                record.requested = event.requested.clone();
                outcome.known += 1;
                continue;
            }

            let seq = self.next_seq;
            self.next_seq += 1;
            self.records
                .insert(key, (seq, WarningRecord::from_event(&event, now)));
            outcome.fresh.push(event);
        }

        debug!(
            fresh = outcome.fresh.len(),
            known = outcome.known,
            expired = outcome.expired,
            remembered = self.records.len(),
            "Reconciled warnings"
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(icao: &str, callsign: Option<&str>, parameter: Parameter, at: DateTime<Utc>) -> ViolationEvent {
        ViolationEvent {
            icao: FlightId::new(icao),
            callsign: callsign.map(str::to_string),
            parameter,
            requested: parameter.describe_value(Some(100.0)),
            detected_at: at,
        }
    }

    fn memory() -> WarningMemory {
        WarningMemory::new(Duration::seconds(60))
    }

    #[test]
    fn first_sighting_is_fresh() {
        let mut memory = memory();
        let t0 = Utc::now();
        let outcome = memory.reconcile(vec![event("abc", None, Parameter::Altitude, t0)], t0);
        assert_eq!(outcome.fresh.len(), 1);
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn repeat_within_ttl_is_suppressed_and_updates_label() {
        let mut memory = memory();
        let t0 = Utc::now();
        memory.reconcile(vec![event("abc", None, Parameter::Altitude, t0)], t0);

        let t1 = t0 + Duration::seconds(30);
        let mut repeat = event("abc", Some("RYR12"), Parameter::Altitude, t1);
        repeat.requested = "11000 feet".into();
        let outcome = memory.reconcile(vec![repeat], t1);

        assert!(outcome.fresh.is_empty());
        assert_eq!(outcome.known, 1);
        let record = memory.get(&FlightId::new("abc"), Parameter::Altitude).unwrap();
        assert_eq!(record.callsign.as_deref(), Some("RYR12"));
        assert_eq!(record.requested, "11000 feet");
        assert_eq!(record.first_seen, t0);
    }

    #[test]
    fn expired_record_resurfaces_with_new_first_seen() {
        let mut memory = memory();
        let t0 = Utc::now();
        memory.reconcile(vec![event("abc", None, Parameter::Altitude, t0)], t0);
        memory.reconcile(
            vec![event("abc", None, Parameter::Altitude, t0)],
            t0 + Duration::seconds(30),
        );

        let t2 = t0 + Duration::seconds(61);
        let outcome = memory.reconcile(vec![event("abc", None, Parameter::Altitude, t2)], t2);
        assert_eq!(outcome.fresh.len(), 1);
        assert_eq!(outcome.expired, 1);
        let record = memory.get(&FlightId::new("abc"), Parameter::Altitude).unwrap();
        assert_eq!(record.first_seen, t2);
    }

    #[test]
    fn age_equal_to_ttl_is_pruned() {
        let mut memory = memory();
        let t0 = Utc::now();
        memory.reconcile(vec![event("abc", None, Parameter::Track, t0)], t0);
        assert_eq!(memory.prune(t0 + Duration::seconds(59)), 0);
        assert_eq!(memory.prune(t0 + Duration::seconds(60)), 1);
        assert!(memory.is_empty());
    }

    #[test]
    fn distinct_parameters_of_one_flight_are_independent() {
        let mut memory = memory();
        let t0 = Utc::now();
        let outcome = memory.reconcile(
            vec![
                event("abc", Some("RYR12"), Parameter::Altitude, t0),
                event("abc", Some("RYR12"), Parameter::Track, t0),
            ],
            t0,
        );
        assert_eq!(outcome.fresh.len(), 2);
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn label_update_applies_across_parameters() {
        let mut memory = memory();
        let t0 = Utc::now();
        memory.reconcile(vec![event("abc", None, Parameter::Altitude, t0)], t0);

        let t1 = t0 + Duration::seconds(5);
        let outcome = memory.reconcile(vec![event("abc", Some("DLH4"), Parameter::Track, t1)], t1);
        assert_eq!(outcome.fresh.len(), 1);

        let altitude = memory.get(&FlightId::new("abc"), Parameter::Altitude).unwrap();
        assert_eq!(altitude.callsign.as_deref(), Some("DLH4"));
    }

    #[test]
    fn missing_callsign_keeps_remembered_label() {
        let mut memory = memory();
        let t0 = Utc::now();
        memory.reconcile(vec![event("abc", Some("RYR12"), Parameter::Altitude, t0)], t0);
        memory.reconcile(vec![event("abc", None, Parameter::Altitude, t0)], t0);
        let record = memory.get(&FlightId::new("abc"), Parameter::Altitude).unwrap();
        assert_eq!(record.callsign.as_deref(), Some("RYR12"));
    }

    #[test]
    fn records_keep_insertion_order() {
        let mut memory = memory();
        let t0 = Utc::now();
        memory.reconcile(
            vec![
                event("ccc", None, Parameter::Altitude, t0),
                event("aaa", None, Parameter::Altitude, t0),
                event("bbb", None, Parameter::GroundSpeed, t0),
            ],
            t0,
        );
        let order: Vec<_> = memory.records().iter().map(|r| r.icao.as_str().to_string()).collect();
        assert_eq!(order, vec!["ccc", "aaa", "bbb"]);
    }
}
