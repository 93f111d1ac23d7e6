//! Humidity alert: threshold check plus the tone burst it triggers.

use crate::app::model::EnvironmentSample;
use crate::app::ports::ActuatorPort;
use crate::config::FeederConfig;

/// Threshold evaluation.  Strictly greater-than: a reading equal to the
/// threshold is not an alert.
#[derive(Debug, Clone, Copy)]
pub struct HumidityAlert {
    threshold_pct: f32,
}

impl HumidityAlert {
    pub fn new(threshold_pct: f32) -> Self {
        Self { threshold_pct }
    }

    pub fn threshold_pct(&self) -> f32 {
        self.threshold_pct
    }

    pub fn exceeds(&self, sample: &EnvironmentSample) -> bool {
        sample.relative_humidity_pct > self.threshold_pct
    }
}

/// A fixed number of equal tones, `spacing_ms` apart (start to start).
///
/// [`start`](Self::start) arms the burst; [`service`](Self::service) sounds
/// the next tone once it is due.  Restarting an armed burst rewinds it.
#[derive(Debug, Clone)]
pub struct ToneBurst {
    count: u8,
    tone_hz: u32,
    tone_ms: u32,
    spacing_ms: u32,
    remaining: u8,
    next_tone_ms: u64,
}

impl ToneBurst {
    pub fn new(config: &FeederConfig) -> Self {
        Self {
            count: config.alert_burst_count,
            tone_hz: config.alert_tone_hz,
            tone_ms: config.alert_tone_ms,
            spacing_ms: config.alert_tone_spacing_ms,
            remaining: 0,
            next_tone_ms: 0,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.remaining = self.count;
        self.next_tone_ms = now_ms;
    }

    pub fn is_playing(&self) -> bool {
        self.remaining > 0
    }

    /// Sound the next tone if one is due.  Returns `true` if a tone started.
    pub fn service(&mut self, now_ms: u64, hw: &mut impl ActuatorPort) -> bool {
        if self.remaining == 0 || now_ms < self.next_tone_ms {
            return false;
        }
        hw.sound(self.tone_hz, self.tone_ms);
        self.remaining -= 1;
        self.next_tone_ms = now_ms + u64::from(self.spacing_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tones(Vec<(u32, u32)>);

    impl ActuatorPort for Tones {
        fn set_position(&mut self, _: u8) {}
        fn set_indicator(&mut self, _: bool) {}
        fn sound(&mut self, frequency_hz: u32, duration_ms: u32) {
            self.0.push((frequency_hz, duration_ms));
        }
    }

    #[test]
    fn threshold_is_strict() {
        let alert = HumidityAlert::new(70.0);
        assert!(!alert.exceeds(&EnvironmentSample::new(22.0, 70.0)));
        assert!(alert.exceeds(&EnvironmentSample::new(22.0, 70.01)));
        assert!(!alert.exceeds(&EnvironmentSample::new(22.0, 45.0)));
    }

    #[test]
    fn burst_spaces_tones() {
        let mut burst = ToneBurst::new(&FeederConfig::default());
        let mut hw = Tones::default();
        burst.start(1_000);

        assert!(burst.service(1_000, &mut hw));
        assert!(!burst.service(1_100, &mut hw));
        assert!(burst.service(1_200, &mut hw));
        assert!(burst.service(1_425, &mut hw));
        assert!(!burst.is_playing());
        assert!(!burst.service(2_000, &mut hw));
        assert_eq!(hw.0, vec![(2000, 150); 3]);
    }

    #[test]
    fn restart_rewinds_the_burst() {
        let mut burst = ToneBurst::new(&FeederConfig::prototype());
        let mut hw = Tones::default();
        burst.start(0);
        assert!(burst.service(0, &mut hw));
        assert!(burst.service(200, &mut hw));

        burst.start(300);
        let mut t = 300;
        while burst.is_playing() {
            burst.service(t, &mut hw);
            t += 25;
        }
        assert_eq!(hw.0.len(), 2 + 5);
    }
}
