//! Dispense sequencer.
//!
//! One dispense = indicator on, chime, constant-velocity sweep across the
//! current segment, segment advance, indicator off.
//!
//! Two drivers share the same step logic:
//!
//! - [`DispenseSequencer::start`] + [`DispenseSequencer::service`] advance
//!   the sweep one position per call, so the control loop keeps polling
//!   touch input while the servo moves.
//! - [`DispenseSequencer::dispense_once`] runs the whole sequence to
//!   completion, sleeping between steps with an [`embedded_hal`] delay.
//!
//! ```text
//!   Idle ──start()──▶ Sweeping ──service() × N──▶ Idle (+ cycle.advance)
//! ```

pub mod segments;
pub mod sweep;

use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::app::model::DispenseReason;
use crate::app::ports::ActuatorPort;
use crate::config::FeederConfig;

use segments::{AngleRange, SegmentCycle};
use sweep::Sweep;

/// Why [`DispenseSequencer::start`] refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenseError {
    /// Bounded cycle: every segment has been dispensed.
    Exhausted,
    /// A sweep is already in progress.
    Busy,
}

impl fmt::Display for DispenseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "all segments dispensed"),
            Self::Busy => write!(f, "dispense already in progress"),
        }
    }
}

/// Returned by [`DispenseSequencer::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispenseStarted {
    pub reason: DispenseReason,
    pub segment: usize,
    pub range: AngleRange,
}

/// Returned once the final sweep step has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispenseCompleted {
    pub reason: DispenseReason,
    pub segment: usize,
    pub range: AngleRange,
    /// Position commands issued during the sweep.
    pub positions: usize,
}

#[derive(Debug, Clone)]
struct ActiveSweep {
    reason: DispenseReason,
    segment: usize,
    range: AngleRange,
    sweep: Sweep,
    next_step_ms: u64,
    positions: usize,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Sweeping(ActiveSweep),
}

/// Owns the segment cycle and the in-flight sweep, if any.
#[derive(Debug, Clone)]
pub struct DispenseSequencer {
    cycle: SegmentCycle,
    step_deg: u8,
    step_delay_ms: u32,
    chime_hz: u32,
    chime_ms: u32,
    phase: Phase,
}

impl DispenseSequencer {
    pub fn new(config: &FeederConfig) -> Self {
        Self {
            cycle: SegmentCycle::new(config.segments.clone(), config.segment_policy),
            step_deg: config.sweep_step_deg,
            step_delay_ms: config.sweep_step_delay_ms,
            chime_hz: config.chime_hz,
            chime_ms: config.chime_ms,
            phase: Phase::Idle,
        }
    }

    // ── Non-blocking form ─────────────────────────────────────

    /// Begin a dispense: indicator on, chime, first position command.
    pub fn start(
        &mut self,
        reason: DispenseReason,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
    ) -> Result<DispenseStarted, DispenseError> {
        if self.is_busy() {
            return Err(DispenseError::Busy);
        }
        let (segment, range) = self.cycle.current().ok_or(DispenseError::Exhausted)?;

        hw.set_indicator(true);
        hw.sound(self.chime_hz, self.chime_ms);

        let mut sweep = Sweep::new(range, self.step_deg);
        let mut positions = 0;
        if let Some(angle) = sweep.next() {
            hw.set_position(angle);
            positions += 1;
        }

        self.phase = Phase::Sweeping(ActiveSweep {
            reason,
            segment,
            range,
            sweep,
            next_step_ms: now_ms + u64::from(self.step_delay_ms),
            positions,
        });

        Ok(DispenseStarted {
            reason,
            segment,
            range,
        })
    }

    /// Advance the running sweep if its next step is due.
    ///
    /// At most one step per call; a late call does not replay missed steps.
    pub fn service(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
    ) -> Option<DispenseCompleted> {
        let Phase::Sweeping(active) = &mut self.phase else {
            return None;
        };
        if now_ms < active.next_step_ms {
            return None;
        }
        active.next_step_ms = now_ms + u64::from(self.step_delay_ms);
        self.step(hw)
    }

    // ── Blocking form ─────────────────────────────────────────

    /// Run one complete dispense, sleeping `sweep_step_delay_ms` after
    /// every position command.
    pub fn dispense_once(
        &mut self,
        reason: DispenseReason,
        hw: &mut impl ActuatorPort,
        delay: &mut impl DelayNs,
    ) -> Result<DispenseCompleted, DispenseError> {
        self.start(reason, 0, hw)?;
        loop {
            delay.delay_ms(self.step_delay_ms);
            if let Some(done) = self.step(hw) {
                return Ok(done);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Sweeping(_))
    }

    pub fn is_exhausted(&self) -> bool {
        self.cycle.is_exhausted()
    }

    pub fn cycle(&self) -> &SegmentCycle {
        &self.cycle
    }

    // ── Internal ──────────────────────────────────────────────

    /// Issue the next position, or finish when the sweep has run out.
    fn step(&mut self, hw: &mut impl ActuatorPort) -> Option<DispenseCompleted> {
        let Phase::Sweeping(active) = &mut self.phase else {
            return None;
        };
        if let Some(angle) = active.sweep.next() {
            hw.set_position(angle);
            active.positions += 1;
            return None;
        }

        let done = DispenseCompleted {
            reason: active.reason,
            segment: active.segment,
            range: active.range,
            positions: active.positions,
        };
        self.phase = Phase::Idle;
        self.cycle.advance();
        hw.set_indicator(false);
        Some(done)
    }
}
