//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder, ...).

use crate::dispense::segments::AngleRange;
use crate::error::SensorError;

use super::model::{DispenseReason, EnvironmentSample};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop has started.
    Started {
        touch_enabled: bool,
        telemetry_enabled: bool,
    },

    /// The gesture is configured but the touch controller is missing;
    /// dispensing is timer-driven only.
    TouchUnavailable,

    /// A tick produced a fresh environment sample.
    EnvironmentSampled(EnvironmentSample),

    /// The environment read failed; the tick skipped telemetry and the alert.
    SensorReadFailed(SensorError),

    /// Humidity crossed the alert threshold; a tone burst started.
    HumidityAlert { humidity_pct: f32, threshold_pct: f32 },

    /// A dispense sweep began.
    DispenseStarted {
        reason: DispenseReason,
        segment: usize,
        range: AngleRange,
    },

    /// A dispense sweep finished and the segment cycle advanced.
    DispenseCompleted {
        reason: DispenseReason,
        segment: usize,
        positions: usize,
    },

    /// A dispense was requested during a sweep and is held until it ends.
    DispenseDeferred(DispenseReason),

    /// A dispense was requested while another one was already held.
    DispenseDropped(DispenseReason),

    /// Every segment of a bounded cycle has been used.  Emitted once.
    SegmentsExhausted { dispensed: u32 },

    /// A pad matched the next step of the unlock gesture.
    GestureProgress { progress: usize, len: usize },

    /// A wrong pad or a timeout discarded partial gesture progress.
    GestureAborted { expired: bool },

    /// The full unlock gesture was entered.
    GestureMatched,
}
