//! Peripheral bring-up.
//!
//! Separates the one fatal failure (no environment sensor) from the
//! degraded ones (no touch controller), then parks the servo.  Network
//! bring-up lives in `main`, since its failure never blocks the control
//! loop.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::error::Error;

use super::ports::{ActuatorPort, EnvironmentPort, TouchPort};

/// Servo angle held between dispenses until the first sweep.
pub const HOME_ANGLE_DEG: u8 = 0;
/// Time allowed for the servo to reach home from any position.
pub const HOME_SETTLE_MS: u32 = 600;

/// What came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    /// `false` = touch reads as an empty mask for the rest of the run.
    pub touch_present: bool,
}

/// Probe both sensors.
///
/// Returns `Err` when the environment sensor is missing; the caller must
/// not start the control loop in that case.  A missing touch controller
/// is only logged.
pub fn bring_up<H>(hw: &mut H, touch_wanted: bool) -> Result<StartupReport, Error>
where
    H: EnvironmentPort + TouchPort,
{
    EnvironmentPort::begin(hw).map_err(|e| {
        warn!("Environment sensor not found: {}", e);
        Error::Sensor(e)
    })?;
    info!("Environment sensor ready");

    if !touch_wanted {
        return Ok(StartupReport {
            touch_present: false,
        });
    }

    let touch_present = match TouchPort::begin(hw) {
        Ok(()) => {
            info!("Touch controller ready");
            true
        }
        Err(e) => {
            warn!("Touch controller not found ({}), gesture input disabled", e);
            false
        }
    };
    Ok(StartupReport { touch_present })
}

/// Drive the servo to [`HOME_ANGLE_DEG`] and wait for it to settle.
///
/// Run once after [`bring_up`] succeeds, before the control loop starts.
pub fn home(hw: &mut impl ActuatorPort, delay: &mut impl DelayNs) {
    hw.set_position(HOME_ANGLE_DEG);
    delay.delay_ms(HOME_SETTLE_MS);
    info!("Servo homed to {}\u{00b0}", HOME_ANGLE_DEG);
}
