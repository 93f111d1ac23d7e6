//! End-to-end scenarios: startup bring-up followed by the running loop,
//! plus the blocking dispense path.

use embedded_hal::delay::DelayNs;

use petfeeder::app::events::AppEvent;
use petfeeder::app::model::DispenseReason;
use petfeeder::app::service::ControlLoop;
use petfeeder::app::startup::{self, StartupReport};
use petfeeder::config::FeederConfig;
use petfeeder::dispense::DispenseSequencer;
use petfeeder::error::{Error, SensorError};

use super::mock_hw::{ActuatorCall, MockHardware, RecordingSink, RecordingTelemetry};

#[derive(Default)]
struct CountingDelay {
    total_ms: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns) / 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
    }
}

fn run(
    control: &mut ControlLoop,
    hw: &mut MockHardware,
    cloud: &mut RecordingTelemetry,
    sink: &mut RecordingSink,
    until_ms: u64,
) {
    let mut now = 0;
    while now < until_ms {
        now += 25;
        control.poll(now, hw, cloud, sink);
    }
}

#[test]
fn touch_absent_degrades_to_timer_only() {
    let mut hw = MockHardware::new();
    hw.touch_present = false;

    let report = startup::bring_up(&mut hw, true).unwrap();
    assert_eq!(
        report,
        StartupReport {
            touch_present: false
        }
    );

    let mut control = ControlLoop::new(FeederConfig::default(), "FD-EFCAFE", 0).unwrap();
    let mut cloud = RecordingTelemetry::new();
    let mut sink = RecordingSink::new();
    control.start(report, &mut sink);

    // The missing controller is announced, then the loop starts timer-only.
    assert_eq!(
        sink.events[..2],
        [
            AppEvent::TouchUnavailable,
            AppEvent::Started {
                touch_enabled: false,
                telemetry_enabled: true,
            },
        ]
    );

    // Taps on a missing controller never reach the recognizer.
    for pad in [0, 1, 2, 3] {
        hw.tap(pad);
    }
    run(&mut control, &mut hw, &mut cloud, &mut sink, 11_000);

    assert_eq!(sink.count(|e| *e == AppEvent::GestureMatched), 0);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::DispenseStarted {
                reason: DispenseReason::Manual,
                ..
            }
        )),
        0
    );
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::DispenseStarted {
                reason: DispenseReason::Auto,
                ..
            }
        )),
        1
    );
}

#[test]
fn touch_present_starts_with_gesture() {
    let mut hw = MockHardware::new();
    let report = startup::bring_up(&mut hw, true).unwrap();

    let mut control = ControlLoop::new(FeederConfig::default(), "FD-EFCAFE", 0).unwrap();
    let mut sink = RecordingSink::new();
    control.start(report, &mut sink);

    assert_eq!(sink.count(|e| *e == AppEvent::TouchUnavailable), 0);
    assert_eq!(
        sink.events,
        vec![AppEvent::Started {
            touch_enabled: true,
            telemetry_enabled: true,
        }]
    );
}

#[test]
fn servo_is_homed_before_the_loop_runs() {
    let mut hw = MockHardware::new();
    let mut delay = CountingDelay::default();
    let report = startup::bring_up(&mut hw, true).unwrap();
    startup::home(&mut hw, &mut delay);

    assert_eq!(hw.calls, vec![ActuatorCall::Position(startup::HOME_ANGLE_DEG)]);
    assert_eq!(startup::HOME_ANGLE_DEG, 0);
    assert_eq!(delay.total_ms, u64::from(startup::HOME_SETTLE_MS));

    let mut control = ControlLoop::new(FeederConfig::default(), "FD-EFCAFE", 0).unwrap();
    let mut cloud = RecordingTelemetry::new();
    let mut sink = RecordingSink::new();
    control.start(report, &mut sink);
    run(&mut control, &mut hw, &mut cloud, &mut sink, 11_000);

    assert_eq!(hw.calls.first(), Some(&ActuatorCall::Position(0)));
    assert_eq!(hw.positions()[..2], [0u8, 0], "first sweep starts from home");
}

#[test]
fn missing_environment_sensor_is_fatal() {
    let mut hw = MockHardware::new();
    hw.environment_present = false;

    assert_eq!(
        startup::bring_up(&mut hw, true),
        Err(Error::Sensor(SensorError::NotDetected))
    );
}

#[test]
fn touch_not_probed_when_gesture_disabled() {
    let mut hw = MockHardware::new();
    let report = startup::bring_up(&mut hw, false).unwrap();
    assert!(!report.touch_present);
}

#[test]
fn sensor_appearing_later_lets_startup_proceed() {
    let mut hw = MockHardware::new();
    hw.environment_present = false;
    assert!(startup::bring_up(&mut hw, true).is_err());

    hw.environment_present = true;
    assert!(startup::bring_up(&mut hw, true).unwrap().touch_present);
}

#[test]
fn blocking_dispense_twice_sweeps_two_segments() {
    let config = FeederConfig::default();
    let mut sequencer = DispenseSequencer::new(&config);
    let mut hw = MockHardware::new();
    let mut delay = CountingDelay::default();

    let first = sequencer
        .dispense_once(DispenseReason::Manual, &mut hw, &mut delay)
        .unwrap();
    let second = sequencer
        .dispense_once(DispenseReason::Manual, &mut hw, &mut delay)
        .unwrap();

    assert_eq!((first.segment, second.segment), (0, 1));
    assert_eq!(first.positions + second.positions, 62);
    assert_eq!(hw.positions().len(), 62);
    assert_eq!(hw.positions()[31], 60, "second sweep starts at 60");
    assert_eq!(sequencer.cycle().index(), 2);
    assert_eq!(sequencer.cycle().completed(), 2);
    assert!(!hw.indicator_on());
    // One delay after each of the 31 position commands, per sweep.
    assert_eq!(delay.total_ms, 2 * 31 * 25);
}
