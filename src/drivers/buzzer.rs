//! Passive piezo buzzer.
//!
//! Tones are non-blocking: [`Buzzer::start`] sets the carrier and records
//! when it must stop, and [`Buzzer::service`] silences it once that time
//! has passed.  Starting a tone while another is sounding replaces it.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: retunes LEDC timer 1 via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerState {
    Silent,
    Sounding { frequency_hz: u32 },
}

pub struct Buzzer {
    state: BuzzerState,
    silence_at_ms: u64,
}

impl Default for Buzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buzzer {
    pub fn new() -> Self {
        Self {
            state: BuzzerState::Silent,
            silence_at_ms: 0,
        }
    }

    pub fn start(&mut self, frequency_hz: u32, duration_ms: u32, now_ms: u64) {
        if frequency_hz == 0 || duration_ms == 0 {
            self.stop();
            return;
        }
        hw_init::tone_start(frequency_hz);
        self.state = BuzzerState::Sounding { frequency_hz };
        self.silence_at_ms = now_ms + u64::from(duration_ms);
    }

    /// Stop the tone once its duration has elapsed.
    pub fn service(&mut self, now_ms: u64) {
        if self.is_sounding() && now_ms >= self.silence_at_ms {
            self.stop();
        }
    }

    pub fn stop(&mut self) {
        hw_init::tone_stop();
        self.state = BuzzerState::Silent;
    }

    pub fn state(&self) -> BuzzerState {
        self.state
    }

    pub fn is_sounding(&self) -> bool {
        !matches!(self.state, BuzzerState::Silent)
    }
}
