//! Constant-velocity servo sweep.
//!
//! A [`Sweep`] yields the position commands for one segment: it starts at
//! the segment's start angle and advances by a fixed step toward the end
//! angle. The step that would reach or cross the end is clamped to the end
//! itself, so the servo lands exactly on the configured angle and never
//! travels outside the segment.
//!
//! ```text
//!   start=120, end=179, step=2
//!   120 122 124 ... 176 178 179
//! ```

use super::segments::AngleRange;

/// Iterator over the position commands of one segment sweep.
#[derive(Debug, Clone)]
pub struct Sweep {
    next: Option<i16>,
    end: i16,
    step: i16,
}

impl Sweep {
    /// `step_deg` must be non-zero (enforced by config validation).
    pub fn new(range: AngleRange, step_deg: u8) -> Self {
        let start = i16::from(range.start);
        let end = i16::from(range.end);
        let magnitude = i16::from(step_deg.max(1));
        let step = if end >= start { magnitude } else { -magnitude };
        Self {
            next: Some(start),
            end,
            step,
        }
    }

    /// Number of position commands a sweep over `range` issues.
    pub fn command_count(range: AngleRange, step_deg: u8) -> usize {
        let step = usize::from(step_deg.max(1));
        usize::from(range.span()).div_ceil(step) + 1
    }

    pub fn is_finished(&self) -> bool {
        self.next.is_none()
    }
}

impl Iterator for Sweep {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let current = self.next?;
        self.next = if current == self.end {
            None
        } else {
            let advanced = current + self.step;
            let crossed = if self.step > 0 {
                advanced >= self.end
            } else {
                advanced <= self.end
            };
            Some(if crossed { self.end } else { advanced })
        };
        Some(current as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(start: u8, end: u8, step: u8) -> Vec<u8> {
        Sweep::new(AngleRange::new(start, end), step).collect()
    }

    #[test]
    fn even_span_lands_on_end() {
        let v = collect(0, 60, 2);
        assert_eq!(v.first(), Some(&0));
        assert_eq!(v.last(), Some(&60));
        assert_eq!(v.len(), 31);
    }

    #[test]
    fn odd_span_clamps_last_step() {
        let v = collect(120, 179, 2);
        assert_eq!(&v[v.len() - 3..], &[176, 178, 179]);
        assert_eq!(v.len(), Sweep::command_count(AngleRange::new(120, 179), 2));
    }

    #[test]
    fn reverse_sweep_descends() {
        let v = collect(90, 10, 25);
        assert_eq!(v, vec![90, 65, 40, 15, 10]);
    }

    #[test]
    fn zero_span_emits_single_command() {
        assert_eq!(collect(45, 45, 2), vec![45]);
    }

    #[test]
    fn full_travel_worst_case() {
        let v = collect(0, 180, 2);
        assert_eq!(v.len(), 91);
        assert_eq!(Sweep::command_count(AngleRange::new(0, 180), 2), 91);
    }

    #[test]
    fn finished_after_last_command() {
        let mut s = Sweep::new(AngleRange::new(10, 12), 2);
        assert_eq!(s.next(), Some(10));
        assert_eq!(s.next(), Some(12));
        assert!(s.is_finished());
        assert_eq!(s.next(), None);
    }
}
