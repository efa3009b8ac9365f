//! End-to-end behaviour of the evaluate → remember → dispatch pipeline.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use radar_compliance::*;

#[derive(Default)]
struct QueueSource(Mutex<VecDeque<MonitorResult<Vec<Flight>>>>);

impl QueueSource {
    fn push(&self, reply: MonitorResult<Vec<Flight>>) {
        self.0.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl DataSource for QueueSource {
    async fn fetch(&self) -> MonitorResult<Vec<Flight>> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MonitorError::SourceUnavailable("connection refused".into())))
    }
}

#[derive(Default)]
struct Console {
    alerts: Mutex<Vec<String>>,
    cues: Mutex<usize>,
    map_clears: Mutex<usize>,
    markers: Mutex<Vec<MarkerState>>,
}

impl MapRenderer for Console {
    fn render(&self, markers: &[MarkerState]) {
        *self.markers.lock().unwrap() = markers.to_vec();
    }
    fn clear(&self) {
        self.markers.lock().unwrap().clear();
        *self.map_clears.lock().unwrap() += 1;
    }
}

impl AlertPanel for Console {
    fn show(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
    fn hide(&self) {}
    fn play_cue(&self) {
        *self.cues.lock().unwrap() += 1;
    }
}

impl FlightDetailView for Console {
    fn show(&self, _detail: &FlightDetail) {}
    fn hide(&self) {}
}

struct Rig {
    monitor: ComplianceMonitor,
    source: Arc<QueueSource>,
    console: Arc<Console>,
    clock: Arc<ManualClock>,
    activation: Arc<ActivationFlag>,
}

fn rig(identity: StaticIdentity) -> Rig {
    let source = Arc::new(QueueSource::default());
    let console = Arc::new(Console::default());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let activation = Arc::new(ActivationFlag::new(false));
    let monitor = ComplianceMonitor::new(
        MonitorConfig {
            warning_ttl_secs: 60,
            ..Default::default()
        },
        source.clone(),
        Arc::new(identity),
        Collaborators {
            map: console.clone(),
            panel: console.clone(),
            detail: console.clone(),
            activation: activation.clone(),
        },
    )
    .unwrap()
    .with_clock(clock.clone());
    Rig {
        monitor,
        source,
        console,
        clock,
        activation,
    }
}

fn flight(icao: &str, issuer: &str, altitude_due: DateTime<Utc>, track_due: Option<DateTime<Utc>>) -> Flight {
    Flight::new(icao).with_callsign("SAS901").with_directive(Directive {
        issuer: issuer.into(),
        issuer_name: Some("Operator".into()),
        altitude: ParameterDirective::pending(24000.0, altitude_due),
        ground_speed: ParameterDirective::compliant(Some(300.0)),
        track: match track_due {
            Some(due) => ParameterDirective::pending(180.0, due),
            None => ParameterDirective::compliant(Some(180.0)),
        },
    })
}

fn fresh_of(outcome: &TickOutcome) -> Vec<ViolationEvent> {
    match outcome {
        TickOutcome::Evaluated { fresh, .. } => fresh.clone(),
        TickOutcome::Skipped { reason } => panic!("tick skipped: {}", reason),
    }
}

#[tokio::test]
async fn ttl_window_measured_from_first_detection() {
    let mut rig = rig(StaticIdentity::new("atc-1"));
    let t0 = rig.clock.now();
    let overdue = t0 - Duration::seconds(1);

    rig.source.push(Ok(vec![flight("4ca1fa", "atc-1", overdue, None)]));
    assert_eq!(fresh_of(&rig.monitor.tick().await).len(), 1);
    rig.monitor.apply_command(OperatorCommand::Acknowledge);

    rig.clock.advance(Duration::seconds(30));
    rig.source.push(Ok(vec![flight("4ca1fa", "atc-1", overdue, None)]));
    assert!(fresh_of(&rig.monitor.tick().await).is_empty());
    assert!(!rig.monitor.session().panel.is_visible());

    rig.clock.advance(Duration::seconds(31));
    rig.source.push(Ok(vec![flight("4ca1fa", "atc-1", overdue, None)]));
    let fresh = fresh_of(&rig.monitor.tick().await);
    assert_eq!(fresh.len(), 1);
    assert!(rig.monitor.session().panel.is_visible());

    let record = rig
        .monitor
        .session()
        .memory
        .get(&FlightId::new("4ca1fa"), Parameter::Altitude)
        .unwrap();
    assert_eq!(record.first_seen, t0 + Duration::seconds(61));
    assert_eq!(rig.console.alerts.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn open_panel_is_not_updated_by_later_warnings() {
    let mut rig = rig(StaticIdentity::new("atc-1"));
    let t0 = rig.clock.now();

    rig.source.push(Ok(vec![flight("4ca1fa", "atc-1", t0 - Duration::seconds(1), None)]));
    rig.monitor.tick().await;
    let opened = rig.monitor.session().panel.clone();

    rig.clock.advance(Duration::seconds(5));
    rig.source.push(Ok(vec![
        flight("4ca1fa", "atc-1", t0 - Duration::seconds(1), None),
        flight("4ca1fb", "atc-1", t0, Some(t0)),
    ]));
    let fresh = fresh_of(&rig.monitor.tick().await);

    assert_eq!(fresh.len(), 2, "altitude and track of the second flight are new");
    assert_eq!(rig.monitor.session().panel, opened);
    assert_eq!(rig.console.alerts.lock().unwrap().len(), 1);

    // Remembered while the panel was open, so acknowledging does not replay them.
    rig.monitor.apply_command(OperatorCommand::Acknowledge);
    rig.clock.advance(Duration::seconds(5));
    rig.source.push(Ok(vec![flight("4ca1fb", "atc-1", t0, Some(t0))]));
    assert!(fresh_of(&rig.monitor.tick().await).is_empty());
    assert!(!rig.monitor.session().panel.is_visible());
}

#[tokio::test]
async fn failed_fetch_keeps_alert_and_memory() {
    let mut rig = rig(StaticIdentity::new("atc-1"));
    let t0 = rig.clock.now();

    rig.source.push(Ok(vec![flight("4ca1fa", "atc-1", t0 - Duration::seconds(1), None)]));
    rig.monitor.tick().await;
    assert_eq!(rig.console.markers.lock().unwrap().len(), 1);

    rig.source.push(Err(MonitorError::MalformedSnapshot("truncated".into())));
    let outcome = rig.monitor.tick().await;

    assert!(matches!(outcome, TickOutcome::Skipped { .. }));
    assert!(rig.console.markers.lock().unwrap().is_empty());
    assert_eq!(*rig.console.map_clears.lock().unwrap(), 1);
    assert!(rig.monitor.session().panel.is_visible());
    assert_eq!(rig.monitor.session().memory.len(), 1);
}

#[tokio::test]
async fn other_operators_violations_need_admin() {
    let mut plain = rig(StaticIdentity::new("atc-1").with_admin_role("admin"));
    let t0 = plain.clock.now();
    plain.source.push(Ok(vec![flight("4ca1fa", "atc-2", t0 - Duration::seconds(1), None)]));
    let outcome = plain.monitor.tick().await;
    assert!(fresh_of(&outcome).is_empty());
    let markers = plain.console.markers.lock().unwrap().clone();
    assert_eq!(markers[0].status, ComplianceStatus::Warning);
    assert_eq!(markers[0].ownership, Ownership::Other);

    let mut admin = rig(
        StaticIdentity::new("atc-1")
            .with_admin_role("admin")
            .with_role("admin"),
    );
    let t0 = admin.clock.now();
    admin.source.push(Ok(vec![flight("4ca1fa", "atc-2", t0 - Duration::seconds(1), None)]));
    assert_eq!(fresh_of(&admin.monitor.tick().await).len(), 1);
}

#[tokio::test]
async fn audio_cue_waits_for_interaction() {
    let mut rig = rig(StaticIdentity::new("atc-1"));
    let t0 = rig.clock.now();

    rig.source.push(Ok(vec![flight("4ca1fa", "atc-1", t0 - Duration::seconds(1), None)]));
    rig.monitor.tick().await;
    assert_eq!(*rig.console.cues.lock().unwrap(), 0);

    rig.monitor.apply_command(OperatorCommand::Acknowledge);
    rig.activation.mark_interacted();
    rig.source.push(Ok(vec![flight("4ca1fb", "atc-1", t0 - Duration::seconds(1), None)]));
    rig.monitor.tick().await;
    assert_eq!(*rig.console.cues.lock().unwrap(), 1);

    let alerts = rig.console.alerts.lock().unwrap();
    assert!(alerts[1].contains("Flight SAS901 (4ca1fb) is not at requested altitude at 24000 feet"));
}
