//! Mock adapters for integration tests.
//!
//! `MockHardware` records every actuator call and replays scripted
//! environment readings and touch masks, so tests can drive the control
//! loop pass by pass without real I2C, PWM or GPIO.

use std::collections::VecDeque;

use petfeeder::app::events::AppEvent;
use petfeeder::app::model::EnvironmentSample;
use petfeeder::app::ports::{ActuatorPort, EnvironmentPort, EventSink, TelemetryPort, TouchPort};
use petfeeder::error::SensorError;
use petfeeder::gesture::PadMask;
use petfeeder::telemetry::TelemetryRecord;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Position(u8),
    Indicator(bool),
    Sound { frequency_hz: u32, duration_ms: u32 },
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    /// Returned by `read` once `scripted_readings` is empty.
    pub reading: Result<EnvironmentSample, SensorError>,
    pub scripted_readings: VecDeque<Result<EnvironmentSample, SensorError>>,
    pub environment_present: bool,
    pub touch_present: bool,
    /// One mask per `poll`; empty once drained.
    pub touches: VecDeque<PadMask>,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            reading: Ok(EnvironmentSample::new(22.5, 45.0)),
            scripted_readings: VecDeque::new(),
            environment_present: true,
            touch_present: true,
            touches: VecDeque::new(),
            reads: 0,
        }
    }

    pub fn with_humidity(humidity_pct: f32) -> Self {
        let mut hw = Self::new();
        hw.reading = Ok(EnvironmentSample::new(22.5, humidity_pct));
        hw
    }

    /// Press `pad` on the next poll and release it on the one after.
    pub fn tap(&mut self, pad: u8) {
        self.touches.push_back(PadMask::from(1 << pad));
        self.touches.push_back(PadMask::empty());
    }

    pub fn positions(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Position(a) => Some(*a),
                _ => None,
            })
            .collect()
    }

    pub fn sounds(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Sound {
                    frequency_hz,
                    duration_ms,
                } => Some((*frequency_hz, *duration_ms)),
                _ => None,
            })
            .collect()
    }

    pub fn indicator_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Indicator(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn set_position(&mut self, angle_deg: u8) {
        self.calls.push(ActuatorCall::Position(angle_deg));
    }

    fn set_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Indicator(on));
    }

    fn sound(&mut self, frequency_hz: u32, duration_ms: u32) {
        self.calls.push(ActuatorCall::Sound {
            frequency_hz,
            duration_ms,
        });
    }
}

impl EnvironmentPort for MockHardware {
    fn begin(&mut self) -> Result<(), SensorError> {
        if self.environment_present {
            Ok(())
        } else {
            Err(SensorError::NotDetected)
        }
    }

    fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        self.reads += 1;
        self.scripted_readings
            .pop_front()
            .unwrap_or(self.reading)
    }
}

impl TouchPort for MockHardware {
    fn begin(&mut self) -> Result<(), SensorError> {
        if self.touch_present {
            Ok(())
        } else {
            Err(SensorError::NotDetected)
        }
    }

    fn poll(&mut self) -> PadMask {
        if !self.touch_present {
            return PadMask::empty();
        }
        self.touches.pop_front().unwrap_or_default()
    }
}

// ── Telemetry recorder ────────────────────────────────────────

#[derive(Default)]
pub struct RecordingTelemetry {
    pub records: Vec<TelemetryRecord>,
}

#[allow(dead_code)]
impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.records.iter().map(|r| r.event.as_str()).collect()
    }
}

impl TelemetryPort for RecordingTelemetry {
    fn send(&mut self, record: &TelemetryRecord) {
        self.records.push(record.clone());
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
