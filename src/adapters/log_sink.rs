//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                touch_enabled,
                telemetry_enabled,
            } => {
                info!(
                    "START | touch={} telemetry={}",
                    if *touch_enabled { "on" } else { "off" },
                    if *telemetry_enabled { "on" } else { "off" },
                );
            }
            AppEvent::TouchUnavailable => {
                warn!("TOUCH | controller absent, timer-driven dispensing only");
            }
            AppEvent::EnvironmentSampled(s) => {
                info!(
                    "ENV   | T={:.1}\u{00b0}C RH={:.1}%",
                    s.temperature_c, s.relative_humidity_pct
                );
            }
            AppEvent::SensorReadFailed(e) => {
                warn!("ENV   | read failed: {}", e);
            }
            AppEvent::HumidityAlert {
                humidity_pct,
                threshold_pct,
            } => {
                warn!("ALERT | RH={:.1}% > {:.1}%", humidity_pct, threshold_pct);
            }
            AppEvent::DispenseStarted {
                reason,
                segment,
                range,
            } => {
                info!(
                    "FEED  | {} start segment={} {}\u{00b0}->{}\u{00b0}",
                    reason.as_str(),
                    segment,
                    range.start,
                    range.end
                );
            }
            AppEvent::DispenseCompleted {
                reason,
                segment,
                positions,
            } => {
                info!(
                    "FEED  | {} done segment={} steps={}",
                    reason.as_str(),
                    segment,
                    positions
                );
            }
            AppEvent::DispenseDeferred(reason) => {
                info!("FEED  | {} deferred until sweep ends", reason.as_str());
            }
            AppEvent::DispenseDropped(reason) => {
                info!("FEED  | {} dropped, request already pending", reason.as_str());
            }
            AppEvent::SegmentsExhausted { dispensed } => {
                warn!("FEED  | all segments used after {} dispenses", dispensed);
            }
            AppEvent::GestureProgress { progress, len } => {
                info!("TOUCH | progress {}/{}", progress, len);
            }
            AppEvent::GestureAborted { expired } => {
                info!(
                    "TOUCH | sequence reset ({})",
                    if *expired { "timeout" } else { "wrong pad" }
                );
            }
            AppEvent::GestureMatched => {
                info!("TOUCH | gesture matched");
            }
        }
    }
}
