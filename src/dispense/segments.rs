//! Rotation segments and the cycle that walks through them.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::config::MAX_SEGMENTS;

/// One dispense rotation: sweep the servo from `start` to `end` (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleRange {
    pub start: u8,
    pub end: u8,
}

impl AngleRange {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Angular distance covered by the sweep.
    pub fn span(&self) -> u8 {
        self.start.abs_diff(self.end)
    }
}

/// What the cycle does once the last segment has been dispensed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentPolicy {
    /// Wrap back to segment 0.
    Cyclic,
    /// Stop dispensing permanently after every segment has been used once.
    Bounded,
}

/// Ordered segments plus the index of the next one to dispense.
///
/// The index only moves forward, and only through [`advance`](Self::advance)
/// after a completed sweep.
#[derive(Debug, Clone)]
pub struct SegmentCycle {
    segments: Vec<AngleRange, MAX_SEGMENTS>,
    index: usize,
    policy: SegmentPolicy,
    completed: u32,
}

impl SegmentCycle {
    pub fn new(segments: Vec<AngleRange, MAX_SEGMENTS>, policy: SegmentPolicy) -> Self {
        Self {
            segments,
            index: 0,
            policy,
            completed: 0,
        }
    }

    /// The segment the next dispense will sweep, with its index.
    /// `None` once a bounded cycle is exhausted (or if there are no segments).
    pub fn current(&self) -> Option<(usize, AngleRange)> {
        self.segments.get(self.index).map(|s| (self.index, *s))
    }

    /// Move past the segment that was just dispensed.
    pub fn advance(&mut self) {
        let len = self.segments.len();
        if len == 0 {
            return;
        }
        self.completed = self.completed.saturating_add(1);
        self.index = match self.policy {
            SegmentPolicy::Cyclic => (self.index + 1) % len,
            SegmentPolicy::Bounded => (self.index + 1).min(len),
        };
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn policy(&self) -> SegmentPolicy {
        self.policy
    }

    /// Total dispenses completed since boot.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn is_exhausted(&self) -> bool {
        self.current().is_none()
    }
}
