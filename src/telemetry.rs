//! Telemetry record and the failure cool-down used by the cloud adapter.
//!
//! ## Wire format
//!
//! ```json
//! {"deviceId":"FD-EFCAFE","temperature":22.5,"humidity":48.0,"event":"env_reading"}
//! ```

use log::warn;
use serde::Serialize;

use crate::app::model::EnvironmentSample;
use crate::error::CommsError;

/// Value of the `event` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryEvent {
    EnvReading,
    AutoDispense,
    ManualDispense,
}

impl TelemetryEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnvReading => "env_reading",
            Self::AutoDispense => "auto_dispense",
            Self::ManualDispense => "manual_dispense",
        }
    }
}

/// One record as POSTed to the collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    #[serde(rename = "deviceId")]
    pub device_id: heapless::String<32>,
    pub temperature: f32,
    pub humidity: f32,
    pub event: TelemetryEvent,
}

impl TelemetryRecord {
    /// An over-long `device_id` is truncated to the field capacity.
    pub fn new(device_id: &str, sample: &EnvironmentSample, event: TelemetryEvent) -> Self {
        let mut id = heapless::String::new();
        for c in device_id.chars() {
            if id.push(c).is_err() {
                warn!("telemetry: device id truncated to {} bytes", id.len());
                break;
            }
        }
        Self {
            device_id: id,
            temperature: sample.temperature_c,
            humidity: sample.relative_humidity_pct,
            event,
        }
    }

    /// JSON body.
    pub fn to_json(&self) -> Result<Vec<u8>, CommsError> {
        serde_json::to_vec(self).map_err(|_| CommsError::EncodeFailed)
    }
}

// ───────────────────────────────────────────────────────────────
// Failure cool-down
// ───────────────────────────────────────────────────────────────

/// Exponential hold-off after failed sends: 2 s → 4 s → 8 s … capped.
///
/// While held, records are dropped without touching the network, so a
/// dead collector costs one connection timeout per window instead of one
/// per tick.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    current_ms: u64,
    hold_until_ms: Option<u64>,
}

impl Backoff {
    pub const BASE_SECS: u32 = 2;

    pub fn new(max_secs: u32) -> Self {
        let base_ms = u64::from(Self::BASE_SECS) * 1_000;
        Self {
            base_ms,
            max_ms: (u64::from(max_secs) * 1_000).max(base_ms),
            current_ms: base_ms,
            hold_until_ms: None,
        }
    }

    pub fn ready(&self, now_ms: u64) -> bool {
        self.hold_until_ms.is_none_or(|until| now_ms >= until)
    }

    pub fn on_failure(&mut self, now_ms: u64) {
        self.hold_until_ms = Some(now_ms + self.current_ms);
        self.current_ms = (self.current_ms * 2).min(self.max_ms);
    }

    pub fn on_success(&mut self) {
        self.current_ms = self.base_ms;
        self.hold_until_ms = None;
    }

    /// Length of the next hold-off window.
    pub fn current_ms(&self) -> u64 {
        self.current_ms
    }
}
