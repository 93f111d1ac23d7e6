//! Millisecond interval timer.
//!
//! Drives the control tick and the auto-dispense interval.  Time comes
//! from the caller (a monotonic uptime), so the timer is trivially
//! testable and never reads a clock itself.

#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    /// `None` until the first firing of an [`immediate`](Self::immediate) timer.
    last_ms: Option<u64>,
    interval_ms: u64,
}

impl IntervalTimer {
    /// `now_ms` is the baseline: the first firing is one interval later.
    pub fn new(interval_ms: u32, now_ms: u64) -> Self {
        Self {
            last_ms: Some(now_ms),
            interval_ms: u64::from(interval_ms),
        }
    }

    /// Due on the first check, then every interval after that firing.
    pub fn immediate(interval_ms: u32) -> Self {
        Self {
            last_ms: None,
            interval_ms: u64::from(interval_ms),
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
            None => true,
        }
    }

    /// Time since the last firing (or the baseline).  Zero if never fired.
    pub fn elapsed(&self, now_ms: u64) -> u64 {
        self.last_ms.map_or(0, |last| now_ms.saturating_sub(last))
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }

    /// Rebaseline to `now_ms` and return `true` if the interval has elapsed.
    pub fn fire_if_due(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.reset(now_ms);
            true
        } else {
            false
        }
    }
}
