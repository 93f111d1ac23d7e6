//! System configuration parameters
//!
//! All tunable parameters for the PetFeeder system. Two presets exist:
//! [`FeederConfig::default`] is the full build (touch gesture + cloud
//! telemetry), [`FeederConfig::prototype`] is the timer-only build.

use core::fmt;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::dispense::segments::{AngleRange, SegmentPolicy};
use crate::gesture::PAD_COUNT;

/// Maximum number of dispense segments in one cycle.
pub const MAX_SEGMENTS: usize = 8;
/// Maximum length of the unlock gesture.
pub const MAX_GESTURE_LEN: usize = 8;

/// Servo travel limit (degrees).
pub const MAX_ANGLE_DEG: u8 = 180;

const DEFAULT_SEGMENTS: [AngleRange; 3] = [
    AngleRange::new(0, 60),
    AngleRange::new(60, 120),
    AngleRange::new(120, 179),
];

const DEFAULT_GESTURE: [u8; 4] = [0, 1, 2, 3];

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederConfig {
    // --- Timing ---
    /// Control tick period (milliseconds). Environment read, alert and
    /// auto-dispense checks run once per tick.
    pub tick_period_ms: u32,
    /// Main loop pass period (milliseconds). Sweep steps, tone bursts and
    /// touch polling advance once per pass.
    pub poll_interval_ms: u32,
    /// Auto-dispense interval (milliseconds).
    pub auto_dispense_interval_ms: u32,

    // --- Dispenser ---
    /// Ordered rotation segments, one per dispense.
    pub segments: Vec<AngleRange, MAX_SEGMENTS>,
    /// What happens after the last segment has been used.
    pub segment_policy: SegmentPolicy,
    /// Sweep increment (degrees per step).
    pub sweep_step_deg: u8,
    /// Delay between sweep steps (milliseconds).
    pub sweep_step_delay_ms: u32,
    /// Chime played when a dispense starts.
    pub chime_hz: u32,
    pub chime_ms: u32,

    // --- Humidity alert ---
    /// Relative humidity (%) above which the alert burst sounds. Strict `>`.
    pub humidity_alert_threshold_pct: f32,
    /// Number of tones per alert burst.
    pub alert_burst_count: u8,
    pub alert_tone_hz: u32,
    pub alert_tone_ms: u32,
    /// Start-to-start spacing of alert tones (milliseconds).
    pub alert_tone_spacing_ms: u32,

    // --- Touch gesture ---
    pub gesture_enabled: bool,
    /// Pad ids that must be pressed in order to request a manual dispense.
    pub gesture_sequence: Vec<u8, MAX_GESTURE_LEN>,
    /// Maximum gap between two matching pads (milliseconds).
    pub gesture_timeout_ms: u32,

    // --- Cloud ---
    pub telemetry: TelemetryConfig,
    pub network: NetworkConfig,
}

/// Cloud telemetry endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Collector hostname, e.g. `my-hub.azure-devices.net`.
    pub host: String<64>,
    /// Pre-provisioned shared-access-signature, sent verbatim as `Authorization`.
    pub sas_token: String<256>,
    /// Device id override. Empty = derive from the factory MAC.
    pub device_id: String<32>,
    /// HTTP request timeout (milliseconds).
    pub request_timeout_ms: u32,
    /// Upper bound of the failure cool-down (seconds).
    pub max_backoff_secs: u32,
}

/// Wi-Fi station credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ssid: String<32>,
    pub password: String<64>,
    /// Startup connection window (seconds). No reconnect afterwards.
    pub connect_window_secs: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: String::new(),
            sas_token: String::new(),
            device_id: String::new(),
            request_timeout_ms: 5_000,
            max_backoff_secs: 60,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            connect_window_secs: 20,
        }
    }
}

impl Default for FeederConfig {
    fn default() -> Self {
        let mut segments = Vec::new();
        for s in DEFAULT_SEGMENTS {
            let _ = segments.push(s);
        }
        let mut gesture_sequence = Vec::new();
        for pad in DEFAULT_GESTURE {
            let _ = gesture_sequence.push(pad);
        }

        Self {
            // Timing
            tick_period_ms: 1_000,             // 1 Hz
            poll_interval_ms: 25,              // one sweep step per pass
            auto_dispense_interval_ms: 10_000, // 10 s

            // Dispenser
            segments,
            segment_policy: SegmentPolicy::Cyclic,
            sweep_step_deg: 2,
            sweep_step_delay_ms: 25,
            chime_hz: 2_000,
            chime_ms: 150,

            // Humidity alert
            humidity_alert_threshold_pct: 70.0,
            alert_burst_count: 3,
            alert_tone_hz: 2_000,
            alert_tone_ms: 150,
            alert_tone_spacing_ms: 200,

            // Touch gesture
            gesture_enabled: true,
            gesture_sequence,
            gesture_timeout_ms: 3_000,

            telemetry: TelemetryConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl FeederConfig {
    /// Timer-only build: no touch, no cloud, faster interval, louder alert,
    /// and dispensing stops once every segment has been used.
    pub fn prototype() -> Self {
        let mut c = Self::default();
        c.auto_dispense_interval_ms = 5_000;
        c.alert_burst_count = 5;
        c.segment_policy = SegmentPolicy::Bounded;
        c.gesture_enabled = false;
        c.telemetry.enabled = false;
        c
    }

    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 || self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick and poll periods must be non-zero"));
        }
        if self.poll_interval_ms > self.tick_period_ms {
            return Err(ConfigError::ValidationFailed("poll interval longer than tick period"));
        }
        if self.auto_dispense_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("auto-dispense interval must be non-zero"));
        }
        if self.segments.is_empty() {
            return Err(ConfigError::ValidationFailed("at least one segment required"));
        }
        if self
            .segments
            .iter()
            .any(|s| s.start > MAX_ANGLE_DEG || s.end > MAX_ANGLE_DEG)
        {
            return Err(ConfigError::ValidationFailed("segment angle above 180 degrees"));
        }
        if self.sweep_step_deg == 0 {
            return Err(ConfigError::ValidationFailed("sweep step must be non-zero"));
        }
        if !(0.0..=100.0).contains(&self.humidity_alert_threshold_pct) {
            return Err(ConfigError::ValidationFailed("humidity threshold outside 0-100%"));
        }
        if self.alert_burst_count == 0 {
            return Err(ConfigError::ValidationFailed("alert burst count must be non-zero"));
        }
        if self.alert_tone_ms > self.alert_tone_spacing_ms {
            return Err(ConfigError::ValidationFailed("alert tone longer than its spacing"));
        }
        // A burst must finish before the next tick can start another one.
        if u32::from(self.alert_burst_count) * self.alert_tone_spacing_ms > self.tick_period_ms {
            return Err(ConfigError::ValidationFailed("alert burst longer than one tick"));
        }
        if self.gesture_enabled {
            if self.gesture_sequence.is_empty() {
                return Err(ConfigError::ValidationFailed("gesture enabled with empty sequence"));
            }
            if self.gesture_sequence.iter().any(|&p| p as usize >= PAD_COUNT) {
                return Err(ConfigError::ValidationFailed("gesture pad id out of range"));
            }
            if self.gesture_timeout_ms == 0 {
                return Err(ConfigError::ValidationFailed("gesture timeout must be non-zero"));
            }
        }
        if self.telemetry.enabled && self.telemetry.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("telemetry timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Configuration rejected by [`FeederConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}
