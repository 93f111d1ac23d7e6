//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, telemetry, event sinks) implement
//! these traits.  The [`ControlLoop`](super::service::ControlLoop) consumes
//! them via generics, so the domain core never touches hardware directly.

use crate::error::SensorError;
use crate::gesture::PadMask;
use crate::telemetry::TelemetryRecord;

use super::model::EnvironmentSample;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: servo, indicator LED and buzzer.
///
/// Commands are fire-and-forget.  A failing actuator is logged by the
/// adapter; the dispense sequence carries on regardless.
pub trait ActuatorPort {
    /// Command the servo to an absolute angle (0–180°).
    fn set_position(&mut self, angle_deg: u8);

    /// Switch the indicator LED.
    fn set_indicator(&mut self, on: bool);

    /// Start a tone.  Returns immediately; the adapter silences the
    /// buzzer once `duration_ms` has elapsed.
    fn sound(&mut self, frequency_hz: u32, duration_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Temperature / humidity source.
pub trait EnvironmentPort {
    /// Probe and initialise the sensor.  Absence is fatal at startup.
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Take one measurement.
    fn read(&mut self) -> Result<EnvironmentSample, SensorError>;
}

/// Capacitive touch controller.
pub trait TouchPort {
    /// Probe and initialise the controller.  Absence is a degraded mode.
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Pads currently pressed.  Empty when the controller is absent or
    /// the bus read fails.
    fn poll(&mut self) -> PadMask;
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → cloud)
// ───────────────────────────────────────────────────────────────

/// Best-effort record shipping.  Nothing is returned to the caller;
/// failures are the adapter's business.
pub trait TelemetryPort {
    fn send(&mut self, record: &TelemetryRecord);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
