//! Hobby servo on a 50 Hz PWM channel.
//!
//! Angle 0–180° maps linearly onto a 500–2400 µs pulse inside the 20 ms
//! frame.  Generic over [`SetDutyCycle`] so the device build hands in an
//! `LedcDriver` and tests hand in a recorder.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::MAX_ANGLE_DEG;
use crate::error::ActuatorError;

pub const MIN_PULSE_US: u32 = 500;
pub const MAX_PULSE_US: u32 = 2_400;
const PERIOD_US: u32 = 20_000;

pub struct Servo<P> {
    pwm: P,
    angle: Option<u8>,
}

impl<P: SetDutyCycle> Servo<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, angle: None }
    }

    pub fn set_angle(&mut self, angle_deg: u8) -> Result<(), ActuatorError> {
        if angle_deg > MAX_ANGLE_DEG {
            return Err(ActuatorError::AngleOutOfRange);
        }
        let duty = angle_to_duty(angle_deg, self.pwm.max_duty_cycle());
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.angle = Some(angle_deg);
        Ok(())
    }

    /// Last commanded angle.  `None` until the first command.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}

pub fn pulse_us(angle_deg: u8) -> u32 {
    let angle = u32::from(angle_deg.min(MAX_ANGLE_DEG));
    MIN_PULSE_US + angle * (MAX_PULSE_US - MIN_PULSE_US) / u32::from(MAX_ANGLE_DEG)
}

/// Convert an angle to a duty value for a channel whose full scale is `max_duty`.
pub fn angle_to_duty(angle_deg: u8, max_duty: u16) -> u16 {
    (pulse_us(angle_deg) * u32::from(max_duty) / PERIOD_US) as u16
}
