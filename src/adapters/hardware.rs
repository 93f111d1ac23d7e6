//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the sensor drivers and all actuator drivers, exposing them
//! through [`ActuatorPort`], [`EnvironmentPort`] and [`TouchPort`].  This
//! is the only module in the system that touches actual hardware.  The
//! drivers are generic over `embedded-hal` traits, so on non-espidf
//! targets the adapter runs against mock buses and pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, warn};

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::model::EnvironmentSample;
use crate::app::ports::{ActuatorPort, EnvironmentPort, TouchPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::indicator::Indicator;
use crate::drivers::servo::Servo;
use crate::error::SensorError;
use crate::gesture::PadMask;
use crate::sensors::aht20::Aht20;
use crate::sensors::cap1188::Cap1188;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<EnvBus, Delay, TouchBus, Pwm, Led> {
    environment: Aht20<EnvBus, Delay>,
    touch: Cap1188<TouchBus>,
    touch_present: bool,
    servo: Servo<Pwm>,
    indicator: Indicator<Led>,
    buzzer: Buzzer,
    clock: Esp32TimeAdapter,
}

impl<EnvBus, Delay, TouchBus, Pwm, Led> HardwareAdapter<EnvBus, Delay, TouchBus, Pwm, Led>
where
    EnvBus: I2c,
    Delay: DelayNs,
    TouchBus: I2c,
    Pwm: SetDutyCycle,
    Led: OutputPin,
{
    pub fn new(
        environment: Aht20<EnvBus, Delay>,
        touch: Cap1188<TouchBus>,
        servo: Servo<Pwm>,
        indicator: Indicator<Led>,
        clock: Esp32TimeAdapter,
    ) -> Self {
        Self {
            environment,
            touch,
            touch_present: false,
            servo,
            indicator,
            buzzer: Buzzer::new(),
            clock,
        }
    }

    /// Silence an expired tone.  Call once per loop pass.
    pub fn service(&mut self) {
        self.buzzer.service(self.clock.uptime_ms());
    }

    pub fn touch_present(&self) -> bool {
        self.touch_present
    }

    pub fn servo_angle(&self) -> Option<u8> {
        self.servo.angle()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<EnvBus, Delay, TouchBus, Pwm, Led> ActuatorPort
    for HardwareAdapter<EnvBus, Delay, TouchBus, Pwm, Led>
where
    EnvBus: I2c,
    Delay: DelayNs,
    TouchBus: I2c,
    Pwm: SetDutyCycle,
    Led: OutputPin,
{
    fn set_position(&mut self, angle_deg: u8) {
        if let Err(e) = self.servo.set_angle(angle_deg) {
            warn!("Servo {}°: {}", angle_deg, e);
        }
    }

    fn set_indicator(&mut self, on: bool) {
        if let Err(e) = self.indicator.set(on) {
            warn!("Indicator: {}", e);
        }
    }

    fn sound(&mut self, frequency_hz: u32, duration_ms: u32) {
        self.buzzer
            .start(frequency_hz, duration_ms, self.clock.uptime_ms());
    }
}

// ── Sensor port implementations ───────────────────────────────

impl<EnvBus, Delay, TouchBus, Pwm, Led> EnvironmentPort
    for HardwareAdapter<EnvBus, Delay, TouchBus, Pwm, Led>
where
    EnvBus: I2c,
    Delay: DelayNs,
    TouchBus: I2c,
    Pwm: SetDutyCycle,
    Led: OutputPin,
{
    fn begin(&mut self) -> Result<(), SensorError> {
        self.environment.init()
    }

    fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        self.environment.measure()
    }
}

impl<EnvBus, Delay, TouchBus, Pwm, Led> TouchPort
    for HardwareAdapter<EnvBus, Delay, TouchBus, Pwm, Led>
where
    EnvBus: I2c,
    Delay: DelayNs,
    TouchBus: I2c,
    Pwm: SetDutyCycle,
    Led: OutputPin,
{
    fn begin(&mut self) -> Result<(), SensorError> {
        let result = self.touch.init();
        self.touch_present = result.is_ok();
        result
    }

    fn poll(&mut self) -> PadMask {
        if !self.touch_present {
            return PadMask::empty();
        }
        self.touch.touched().unwrap_or_else(|e| {
            debug!("Touch read failed: {}", e);
            PadMask::empty()
        })
    }
}
