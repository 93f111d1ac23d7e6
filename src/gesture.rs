//! Touch-pad unlock gesture.
//!
//! The CAP1188 reports which of its eight pads are currently touched.
//! [`TouchEdge`] turns that level signal into press edges, and
//! [`GestureRecognizer`] matches the edges against an ordered pad
//! sequence that must be entered with no more than `timeout_ms` between
//! consecutive matching presses.
//!
//! Simultaneous presses are processed in ascending pad order.

use heapless::Vec;

use crate::config::MAX_GESTURE_LEN;

/// Number of touch inputs on the controller.
pub const PAD_COUNT: usize = 8;

// ───────────────────────────────────────────────────────────────
// PadMask
// ───────────────────────────────────────────────────────────────

/// Bit `n` set = pad `n` touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadMask(u8);

impl PadMask {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, pad: u8) -> bool {
        (pad as usize) < PAD_COUNT && self.0 & (1 << pad) != 0
    }

    /// Pads set here but not in `previous`.
    pub fn newly_pressed_since(self, previous: PadMask) -> PadMask {
        Self(self.0 & !previous.0)
    }

    /// Touched pad ids in ascending order.
    pub fn pressed(self) -> impl Iterator<Item = u8> {
        (0..PAD_COUNT as u8).filter(move |&pad| self.contains(pad))
    }
}

impl From<u8> for PadMask {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

// ───────────────────────────────────────────────────────────────
// Edge detection
// ───────────────────────────────────────────────────────────────

/// Remembers the previous poll so a held pad counts once.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchEdge {
    previous: PadMask,
}

impl TouchEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and return the pads that went down since the last call.
    pub fn update(&mut self, current: PadMask) -> PadMask {
        let newly = current.newly_pressed_since(self.previous);
        self.previous = current;
        newly
    }
}

// ───────────────────────────────────────────────────────────────
// Recognizer
// ───────────────────────────────────────────────────────────────

/// Result of one touch poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureOutcome {
    /// The whole sequence was entered during this poll.
    pub matched_full: bool,
    /// Progress after this poll (0 after a full match).
    pub progress: usize,
    /// Partial progress was discarded by a wrong pad.
    pub aborted: bool,
    /// Partial progress was discarded because the gap exceeded the timeout.
    pub expired: bool,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    sequence: Vec<u8, MAX_GESTURE_LEN>,
    timeout_ms: u32,
    progress: usize,
    last_match_ms: u64,
    edge: TouchEdge,
}

impl GestureRecognizer {
    pub fn new(sequence: Vec<u8, MAX_GESTURE_LEN>, timeout_ms: u32, now_ms: u64) -> Self {
        Self {
            sequence,
            timeout_ms,
            progress: 0,
            last_match_ms: now_ms,
            edge: TouchEdge::new(),
        }
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Feed the latest pad levels.
    pub fn on_touch_poll(&mut self, current: PadMask, now_ms: u64) -> GestureOutcome {
        let newly = self.edge.update(current);
        let mut outcome = GestureOutcome {
            progress: self.progress,
            ..GestureOutcome::default()
        };
        if newly.is_empty() {
            return outcome;
        }

        if now_ms.saturating_sub(self.last_match_ms) > u64::from(self.timeout_ms) {
            outcome.expired = self.progress > 0;
            self.progress = 0;
        }

        for pad in newly.pressed() {
            if self.sequence.get(self.progress) == Some(&pad) {
                self.progress += 1;
                self.last_match_ms = now_ms;
                if self.progress == self.sequence.len() {
                    outcome.matched_full = true;
                    self.progress = 0;
                }
            } else {
                // The wrong pad is not taken as a fresh start.
                outcome.aborted |= self.progress > 0;
                self.progress = 0;
            }
        }

        outcome.progress = self.progress;
        outcome
    }
}
