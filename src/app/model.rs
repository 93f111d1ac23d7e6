//! Plain domain values shared by the control loop, the ports and telemetry.

use crate::telemetry::TelemetryEvent;

/// One temperature/humidity measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSample {
    pub temperature_c: f32,
    pub relative_humidity_pct: f32,
}

impl EnvironmentSample {
    pub const fn new(temperature_c: f32, relative_humidity_pct: f32) -> Self {
        Self {
            temperature_c,
            relative_humidity_pct,
        }
    }
}

/// Why a dispense happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenseReason {
    /// The auto-dispense interval elapsed.
    Auto,
    /// The unlock gesture was completed on the touch pads.
    Manual,
}

impl DispenseReason {
    /// Event name used in logs and in the telemetry `event` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto_dispense",
            Self::Manual => "manual_dispense",
        }
    }

    pub fn telemetry_event(self) -> TelemetryEvent {
        match self {
            Self::Auto => TelemetryEvent::AutoDispense,
            Self::Manual => TelemetryEvent::ManualDispense,
        }
    }
}
