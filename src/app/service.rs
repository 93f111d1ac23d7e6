//! Control loop, the hexagonal core.
//!
//! [`ControlLoop`] owns every piece of runtime state: the tick and
//! auto-dispense timers, the dispense sequencer, the gesture recognizer,
//! the alert burst and the last good environment sample.  All I/O flows
//! through port traits injected at call sites, so the whole loop runs
//! against mock adapters in tests.
//!
//! ```text
//!  EnvironmentPort ──▶ ┌──────────────────────────┐ ──▶ TelemetryPort
//!  TouchPort       ──▶ │       ControlLoop        │ ──▶ EventSink
//!  ActuatorPort    ◀── │ timers · gesture · sweep │
//!                      └──────────────────────────┘
//! ```
//!
//! The caller invokes [`ControlLoop::poll`] every `poll_interval_ms`.
//! Each pass advances the running sweep by at most one step, services the
//! alert burst and polls the touch pads.  Once per `tick_period_ms` the
//! pass also reads the environment, forwards it, checks the humidity
//! alert and the auto-dispense timer.

use log::{debug, info, warn};

use crate::alert::{HumidityAlert, ToneBurst};
use crate::config::{ConfigError, FeederConfig};
use crate::dispense::{DispenseCompleted, DispenseError, DispenseSequencer};
use crate::gesture::{GestureRecognizer, PadMask};
use crate::telemetry::{TelemetryEvent, TelemetryRecord};
use crate::timer::IntervalTimer;

use super::events::AppEvent;
use super::model::{DispenseReason, EnvironmentSample};
use super::ports::{ActuatorPort, EnvironmentPort, EventSink, TelemetryPort, TouchPort};
use super::startup::StartupReport;

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    config: FeederConfig,
    device_id: heapless::String<32>,
    tick: IntervalTimer,
    auto_dispense: IntervalTimer,
    sequencer: DispenseSequencer,
    /// `None` when the gesture is disabled.
    gesture: Option<GestureRecognizer>,
    alert: HumidityAlert,
    burst: ToneBurst,
    last_sample: Option<EnvironmentSample>,
    /// Single held request while a sweep is running.
    pending: Option<DispenseReason>,
    exhausted_reported: bool,
    tick_count: u64,
}

impl ControlLoop {
    /// Build the loop.  The first tick runs on the first [`poll`](Self::poll);
    /// the auto-dispense interval is baselined at `now_ms`.
    ///
    /// Rejects an invalid configuration.
    pub fn new(config: FeederConfig, device_id: &str, now_ms: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut id = heapless::String::new();
        id.push_str(device_id)
            .map_err(|_| ConfigError::ValidationFailed("device id longer than 32 bytes"))?;

        let gesture = config.gesture_enabled.then(|| {
            GestureRecognizer::new(
                config.gesture_sequence.clone(),
                config.gesture_timeout_ms,
                now_ms,
            )
        });

        Ok(Self {
            tick: IntervalTimer::immediate(config.tick_period_ms),
            auto_dispense: IntervalTimer::new(config.auto_dispense_interval_ms, now_ms),
            sequencer: DispenseSequencer::new(&config),
            gesture,
            alert: HumidityAlert::new(config.humidity_alert_threshold_pct),
            burst: ToneBurst::new(&config),
            device_id: id,
            config,
            last_sample: None,
            pending: None,
            exhausted_reported: false,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the loop.  A gesture-enabled loop whose touch controller
    /// did not come up drops the gesture and runs timer-only.
    pub fn start(&mut self, report: StartupReport, sink: &mut impl EventSink) {
        if self.gesture.is_some() && !report.touch_present {
            self.gesture = None;
            sink.emit(&AppEvent::TouchUnavailable);
        }
        sink.emit(&AppEvent::Started {
            touch_enabled: self.gesture.is_some(),
            telemetry_enabled: self.config.telemetry.enabled,
        });
        info!(
            "ControlLoop started: {} segments ({:?}), auto every {} ms",
            self.sequencer.cycle().len(),
            self.sequencer.cycle().policy(),
            self.config.auto_dispense_interval_ms,
        );
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one pass of the loop.
    ///
    /// `hw` implements all three hardware ports.
    pub fn poll<H>(
        &mut self,
        now_ms: u64,
        hw: &mut H,
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) where
        H: ActuatorPort + EnvironmentPort + TouchPort,
    {
        // 1. Advance a running sweep.
        if let Some(done) = self.sequencer.service(now_ms, hw) {
            self.on_dispense_completed(done, now_ms, hw, telemetry, sink);
        }

        // 2. Tick work.
        if self.tick.fire_if_due(now_ms) {
            self.run_tick(now_ms, hw, telemetry, sink);
        }

        // 3. Touch gesture.
        if self.gesture.is_some() {
            let mask = hw.poll();
            self.on_touch(mask, now_ms, hw, sink);
        }

        // 4. Alert tones.
        self.burst.service(now_ms, hw);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &FeederConfig {
        &self.config
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_sample(&self) -> Option<EnvironmentSample> {
        self.last_sample
    }

    pub fn pending(&self) -> Option<DispenseReason> {
        self.pending
    }

    pub fn is_dispensing(&self) -> bool {
        self.sequencer.is_busy()
    }

    /// Index of the segment the next dispense will use.
    pub fn segment_index(&self) -> usize {
        self.sequencer.cycle().index()
    }

    pub fn dispense_count(&self) -> u32 {
        self.sequencer.cycle().completed()
    }

    pub fn gesture_progress(&self) -> usize {
        self.gesture.as_ref().map_or(0, GestureRecognizer::progress)
    }

    pub fn is_alert_playing(&self) -> bool {
        self.burst.is_playing()
    }

    // ── Internal ──────────────────────────────────────────────

    fn run_tick<H>(
        &mut self,
        now_ms: u64,
        hw: &mut H,
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) where
        H: ActuatorPort + EnvironmentPort,
    {
        self.tick_count += 1;

        match hw.read() {
            Ok(sample) => {
                self.last_sample = Some(sample);
                sink.emit(&AppEvent::EnvironmentSampled(sample));
                self.forward(&sample, TelemetryEvent::EnvReading, telemetry);

                if self.alert.exceeds(&sample) {
                    self.burst.start(now_ms);
                    sink.emit(&AppEvent::HumidityAlert {
                        humidity_pct: sample.relative_humidity_pct,
                        threshold_pct: self.alert.threshold_pct(),
                    });
                }
            }
            Err(e) => {
                warn!("Environment read failed: {}", e);
                sink.emit(&AppEvent::SensorReadFailed(e));
            }
        }

        if self.sequencer.is_exhausted() {
            self.report_exhausted(sink);
            return;
        }
        if self.auto_dispense.fire_if_due(now_ms) {
            self.request_dispense(DispenseReason::Auto, now_ms, hw, sink);
        }
    }

    fn on_touch(
        &mut self,
        mask: PadMask,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        let before = gesture.progress();
        let len = gesture.len();
        let outcome = gesture.on_touch_poll(mask, now_ms);

        if outcome.aborted || outcome.expired {
            sink.emit(&AppEvent::GestureAborted {
                expired: outcome.expired,
            });
        }
        if outcome.progress > 0 && outcome.progress != before {
            sink.emit(&AppEvent::GestureProgress {
                progress: outcome.progress,
                len,
            });
        }
        if outcome.matched_full {
            sink.emit(&AppEvent::GestureMatched);
            if self.sequencer.is_exhausted() {
                self.report_exhausted(sink);
            } else {
                self.request_dispense(DispenseReason::Manual, now_ms, hw, sink);
            }
        }
    }

    /// Start now, hold in the pending slot, or drop.
    fn request_dispense(
        &mut self,
        reason: DispenseReason,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match self.sequencer.start(reason, now_ms, hw) {
            Ok(started) => {
                info!(
                    "Dispense {} on segment {} ({}° -> {}°)",
                    reason.as_str(),
                    started.segment,
                    started.range.start,
                    started.range.end,
                );
                sink.emit(&AppEvent::DispenseStarted {
                    reason,
                    segment: started.segment,
                    range: started.range,
                });
            }
            Err(DispenseError::Busy) => {
                if self.pending.is_none() {
                    self.pending = Some(reason);
                    sink.emit(&AppEvent::DispenseDeferred(reason));
                } else {
                    debug!("Dispense {} dropped, one already pending", reason.as_str());
                    sink.emit(&AppEvent::DispenseDropped(reason));
                }
            }
            Err(DispenseError::Exhausted) => self.report_exhausted(sink),
        }
    }

    fn on_dispense_completed(
        &mut self,
        done: DispenseCompleted,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::DispenseCompleted {
            reason: done.reason,
            segment: done.segment,
            positions: done.positions,
        });

        match self.last_sample {
            Some(sample) => self.forward(&sample, done.reason.telemetry_event(), telemetry),
            None => debug!("No environment sample yet, {} not reported", done.reason.as_str()),
        }

        if self.sequencer.is_exhausted() {
            self.pending = None;
            self.report_exhausted(sink);
        } else if let Some(reason) = self.pending.take() {
            self.request_dispense(reason, now_ms, hw, sink);
        }
    }

    fn forward(
        &self,
        sample: &EnvironmentSample,
        event: TelemetryEvent,
        telemetry: &mut impl TelemetryPort,
    ) {
        if self.config.telemetry.enabled {
            telemetry.send(&TelemetryRecord::new(&self.device_id, sample, event));
        }
    }

    fn report_exhausted(&mut self, sink: &mut impl EventSink) {
        if self.exhausted_reported {
            return;
        }
        self.exhausted_reported = true;
        warn!("All {} segments dispensed, dispensing stopped", self.sequencer.cycle().len());
        sink.emit(&AppEvent::SegmentsExhausted {
            dispensed: self.sequencer.cycle().completed(),
        });
    }
}
