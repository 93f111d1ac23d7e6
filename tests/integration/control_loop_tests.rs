//! Integration tests for the ControlLoop → ports pipeline.
//!
//! The loop is driven pass by pass on a simulated clock (25 ms per pass,
//! matching the default poll interval) against recording mock adapters.

use petfeeder::app::events::AppEvent;
use petfeeder::app::model::{DispenseReason, EnvironmentSample};
use petfeeder::app::service::ControlLoop;
use petfeeder::app::startup;
use petfeeder::config::{ConfigError, FeederConfig};
use petfeeder::error::SensorError;

use super::mock_hw::{ActuatorCall, MockHardware, RecordingSink, RecordingTelemetry};

const PASS_MS: u64 = 25;

struct Rig {
    control: ControlLoop,
    hw: MockHardware,
    cloud: RecordingTelemetry,
    sink: RecordingSink,
    now: u64,
}

impl Rig {
    fn new(config: FeederConfig, mut hw: MockHardware) -> Self {
        let report = startup::bring_up(&mut hw, config.gesture_enabled).unwrap();
        let mut control = ControlLoop::new(config, "FD-TEST01", 0).unwrap();
        let mut sink = RecordingSink::new();
        control.start(report, &mut sink);
        Self {
            control,
            hw,
            cloud: RecordingTelemetry::new(),
            sink,
            now: 0,
        }
    }

    fn run_until(&mut self, t: u64) {
        while self.now < t {
            self.now += PASS_MS;
            self.control
                .poll(self.now, &mut self.hw, &mut self.cloud, &mut self.sink);
        }
    }

    fn started(&self) -> Vec<DispenseReason> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::DispenseStarted { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    fn tap_sequence(&mut self, pads: &[u8]) {
        for &pad in pads {
            self.hw.tap(pad);
        }
    }
}

fn default_rig() -> Rig {
    Rig::new(FeederConfig::default(), MockHardware::new())
}

// ── Auto-dispense ─────────────────────────────────────────────

#[test]
fn auto_dispense_fires_at_interval_and_sweeps_first_segment() {
    let mut rig = default_rig();

    rig.run_until(10_000);
    assert!(rig.started().is_empty(), "nothing before the interval");

    // Ticks run at 25, 1025, ... so the 10 s interval is seen at 10_025.
    rig.run_until(10_025);
    assert_eq!(rig.started(), vec![DispenseReason::Auto]);
    assert!(rig.hw.indicator_on());
    assert!(rig.control.is_dispensing());

    rig.run_until(11_000);
    assert!(!rig.control.is_dispensing());
    assert!(!rig.hw.indicator_on());

    let expected: Vec<u8> = (0..=60).step_by(2).collect();
    assert_eq!(rig.hw.positions(), expected);
    assert_eq!(rig.hw.sounds(), vec![(2_000, 150)], "one chime per dispense");
    assert_eq!(rig.control.segment_index(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::DispenseCompleted {
                reason: DispenseReason::Auto,
                segment: 0,
                positions: 31
            }
        )),
        1
    );
}

#[test]
fn completed_dispense_is_reported_with_last_sample() {
    let mut rig = default_rig();
    rig.run_until(11_000);

    let events = rig.cloud.events();
    assert_eq!(events.iter().filter(|e| **e == "env_reading").count(), 11);
    assert_eq!(events.iter().filter(|e| **e == "auto_dispense").count(), 1);

    let record = rig
        .cloud
        .records
        .iter()
        .find(|r| r.event.as_str() == "auto_dispense")
        .unwrap();
    assert_eq!(record.device_id.as_str(), "FD-TEST01");
    assert_eq!(record.temperature, 22.5);
    assert_eq!(record.humidity, 45.0);
}

#[test]
fn telemetry_disabled_sends_nothing() {
    let mut config = FeederConfig::default();
    config.telemetry.enabled = false;
    let mut rig = Rig::new(config, MockHardware::new());

    rig.run_until(11_000);
    assert!(rig.cloud.records.is_empty());
    assert_eq!(rig.started().len(), 1, "dispensing is unaffected");
}

// ── Humidity alert ────────────────────────────────────────────

#[test]
fn humidity_at_threshold_does_not_alert() {
    let mut rig = Rig::new(FeederConfig::default(), MockHardware::with_humidity(70.0));
    rig.run_until(1_500);

    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::HumidityAlert { .. })), 0);
    assert!(rig.hw.sounds().is_empty());
}

#[test]
fn humidity_above_threshold_plays_burst() {
    let mut rig = Rig::new(FeederConfig::default(), MockHardware::with_humidity(70.01));

    rig.run_until(25);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::HumidityAlert { .. })), 1);
    assert_eq!(rig.hw.sounds().len(), 1, "first tone in the tick's pass");
    assert!(rig.control.is_alert_playing());

    rig.run_until(500);
    assert_eq!(rig.hw.sounds(), vec![(2_000, 150); 3]);
    assert!(!rig.control.is_alert_playing());

    rig.run_until(1_500);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::HumidityAlert { .. })), 2);
    assert_eq!(rig.hw.sounds().len(), 6);
}

#[test]
fn prototype_burst_has_five_tones() {
    let mut rig = Rig::new(FeederConfig::prototype(), MockHardware::with_humidity(85.0));
    rig.run_until(900);
    assert_eq!(rig.hw.sounds().len(), 5);
    assert!(!rig.control.is_alert_playing());

    // The burst fills the whole tick, so the next one restarts it.
    rig.run_until(1_900);
    assert_eq!(rig.hw.sounds().len(), 10);
}

#[test]
fn burst_longer_than_tick_is_rejected() {
    let mut config = FeederConfig::default();
    config.alert_burst_count = 6;
    assert_eq!(
        ControlLoop::new(config, "FD-TEST01", 0).err(),
        Some(ConfigError::ValidationFailed("alert burst longer than one tick"))
    );
}

#[test]
fn every_humid_tick_sounds_a_full_burst() {
    let mut config = FeederConfig::default();
    config.alert_burst_count = 6;
    config.tick_period_ms = 1_200;
    let mut rig = Rig::new(config, MockHardware::with_humidity(85.0));

    rig.run_until(4_800);
    let ticks = rig.control.tick_count();
    assert_eq!(ticks, 4);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::HumidityAlert { .. })) as u64,
        ticks
    );
    assert_eq!(rig.hw.sounds().len() as u64, 6 * ticks);
}

// ── Tick cadence ──────────────────────────────────────────────

#[test]
fn first_tick_runs_on_first_pass() {
    let mut rig = default_rig();
    rig.run_until(25);
    assert_eq!(rig.hw.reads, 1);
    assert_eq!(rig.cloud.events(), vec!["env_reading"]);

    rig.run_until(1_000);
    assert_eq!(rig.hw.reads, 1, "next tick one period after the first");
    rig.run_until(1_025);
    assert_eq!(rig.hw.reads, 2);
}

// ── Environment failures ──────────────────────────────────────

#[test]
fn failed_read_skips_telemetry_and_alert() {
    let mut hw = MockHardware::with_humidity(90.0);
    hw.scripted_readings.push_back(Err(SensorError::Busy));
    let mut rig = Rig::new(FeederConfig::default(), hw);

    rig.run_until(1_000);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::SensorReadFailed(SensorError::Busy)),
        1
    );
    assert!(rig.cloud.records.is_empty());
    assert!(rig.hw.sounds().is_empty());
    assert_eq!(rig.control.last_sample(), None);

    rig.run_until(2_000);
    assert_eq!(rig.cloud.records.len(), 1);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::HumidityAlert { .. })), 1);
    assert_eq!(rig.control.last_sample(), Some(EnvironmentSample::new(22.5, 90.0)));
}

#[test]
fn auto_dispense_runs_without_any_sample() {
    let mut hw = MockHardware::new();
    hw.reading = Err(SensorError::BusError);
    let mut rig = Rig::new(FeederConfig::default(), hw);

    rig.run_until(11_000);
    assert_eq!(rig.started(), vec![DispenseReason::Auto]);
    assert_eq!(rig.control.dispense_count(), 1);
    assert!(
        rig.cloud.records.is_empty(),
        "no sample yet, so the dispense is not reported"
    );
}

// ── Request arbitration ───────────────────────────────────────

#[test]
fn requests_during_sweep_are_deferred_then_dropped() {
    let mut rig = default_rig();
    rig.run_until(10_025);
    assert!(rig.control.is_dispensing());

    // Two full gestures while the auto sweep is still running.
    rig.tap_sequence(&[0, 1, 2, 3, 0, 1, 2, 3]);
    rig.run_until(10_425);

    assert_eq!(rig.sink.count(|e| *e == AppEvent::GestureMatched), 2);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::DispenseDeferred(DispenseReason::Manual)),
        1
    );
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::DispenseDropped(DispenseReason::Manual)),
        1
    );
    assert_eq!(rig.control.pending(), Some(DispenseReason::Manual));

    rig.run_until(12_000);
    assert_eq!(
        rig.started(),
        vec![DispenseReason::Auto, DispenseReason::Manual]
    );
    assert_eq!(rig.control.pending(), None);
    assert_eq!(rig.control.dispense_count(), 2);
    assert_eq!(rig.control.segment_index(), 2);

    let events = rig.cloud.events();
    let auto_at = events.iter().position(|e| *e == "auto_dispense").unwrap();
    let manual_at = events.iter().position(|e| *e == "manual_dispense").unwrap();
    assert!(auto_at < manual_at);
}

#[test]
fn bounded_policy_reports_exhaustion_once() {
    let mut rig = Rig::new(FeederConfig::prototype(), MockHardware::new());
    rig.run_until(30_000);

    assert_eq!(rig.started(), vec![DispenseReason::Auto; 3]);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::SegmentsExhausted { dispensed: 3 }),
        1
    );
    assert!(rig.cloud.records.is_empty(), "prototype has no cloud");
    assert!(!rig.control.is_dispensing());
}

#[test]
fn cyclic_policy_wraps_to_first_segment() {
    let mut config = FeederConfig::default();
    config.auto_dispense_interval_ms = 1_000;
    let mut rig = Rig::new(config, MockHardware::new());

    rig.run_until(4_025);
    assert_eq!(rig.started().len(), 4);
    assert_eq!(rig.control.segment_index(), 0, "fourth sweep reuses segment 0");

    rig.run_until(4_825);
    assert_eq!(rig.control.segment_index(), 1);
    assert_eq!(rig.control.dispense_count(), 4);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::SegmentsExhausted { .. })), 0);
}

// ── Touch gesture ─────────────────────────────────────────────

#[test]
fn gesture_triggers_manual_dispense() {
    let mut rig = default_rig();
    rig.run_until(1_000);
    rig.tap_sequence(&[0, 1, 2, 3]);
    rig.run_until(1_200);

    assert_eq!(rig.started(), vec![DispenseReason::Manual]);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::GestureProgress { len: 4, .. })),
        3
    );
    assert_eq!(rig.hw.positions().first(), Some(&0));
}

#[test]
fn wrong_pad_resets_the_sequence() {
    let mut rig = default_rig();
    rig.run_until(1_000);
    rig.tap_sequence(&[0, 1, 5, 2, 3]);
    rig.run_until(1_300);

    assert!(rig.started().is_empty());
    assert_eq!(rig.control.gesture_progress(), 0);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::GestureAborted { expired: false }),
        1
    );

    rig.tap_sequence(&[0, 1, 2, 3]);
    rig.run_until(1_600);
    assert_eq!(rig.started(), vec![DispenseReason::Manual]);
}

#[test]
fn slow_taps_do_not_combine() {
    let mut rig = default_rig();
    rig.run_until(1_000);
    rig.hw.tap(0);
    rig.run_until(1_100);
    assert_eq!(rig.control.gesture_progress(), 1);

    rig.run_until(4_200);
    rig.tap_sequence(&[1, 2, 3]);
    rig.run_until(4_400);

    assert!(rig.started().is_empty());
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::GestureAborted { expired: true }),
        1
    );
}

#[test]
fn gesture_disabled_ignores_touch() {
    let mut config = FeederConfig::default();
    config.gesture_enabled = false;
    let mut rig = Rig::new(config, MockHardware::new());
    rig.tap_sequence(&[0, 1, 2, 3]);
    rig.run_until(1_000);

    assert!(rig.started().is_empty());
    assert_eq!(rig.hw.touches.len(), 8, "touch is never polled");
    assert!(rig
        .hw
        .calls
        .iter()
        .all(|c| !matches!(c, ActuatorCall::Position(_))));
}
