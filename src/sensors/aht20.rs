//! AHT20 temperature / relative-humidity sensor (I²C, address 0x38).
//!
//! Measurement sequence:
//!
//! 1. `0xAC 0x33 0x00` triggers a conversion.
//! 2. Wait ~80 ms, then read 6 bytes: status, then 20-bit humidity and
//!    20-bit temperature packed across bytes 1–5.
//! 3. Bit 7 of the status byte stays set while the conversion runs.
//!
//! ```text
//!   RH[%] = raw_h / 2^20 * 100
//!   T[°C] = raw_t / 2^20 * 200 - 50
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::model::EnvironmentSample;
use crate::error::SensorError;

pub const ADDRESS: u8 = 0x38;

const CMD_SOFT_RESET: u8 = 0xBA;
const CMD_CALIBRATE: [u8; 3] = [0xBE, 0x08, 0x00];
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

const STATUS_BUSY: u8 = 1 << 7;
const STATUS_CALIBRATED: u8 = 1 << 3;

const POWER_ON_MS: u32 = 40;
const RESET_MS: u32 = 20;
const CALIBRATE_MS: u32 = 10;
const CONVERSION_MS: u32 = 80;
const BUSY_POLL_MS: u32 = 10;
const BUSY_RETRIES: u8 = 5;

const FULL_SCALE: f32 = 1_048_576.0; // 2^20

pub struct Aht20<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C, D> Aht20<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Soft-reset the sensor and make sure it is calibrated.
    ///
    /// A missing acknowledge on the reset command means nothing is on the bus.
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.delay.delay_ms(POWER_ON_MS);
        self.i2c
            .write(ADDRESS, &[CMD_SOFT_RESET])
            .map_err(|_| SensorError::NotDetected)?;
        self.delay.delay_ms(RESET_MS);

        if self.status()? & STATUS_CALIBRATED == 0 {
            self.i2c
                .write(ADDRESS, &CMD_CALIBRATE)
                .map_err(|_| SensorError::BusError)?;
            self.delay.delay_ms(CALIBRATE_MS);
            if self.status()? & STATUS_CALIBRATED == 0 {
                return Err(SensorError::Uncalibrated);
            }
        }
        Ok(())
    }

    /// Trigger a conversion and wait for the result (≈ 80–130 ms).
    pub fn measure(&mut self) -> Result<EnvironmentSample, SensorError> {
        self.i2c
            .write(ADDRESS, &CMD_TRIGGER)
            .map_err(|_| SensorError::BusError)?;
        self.delay.delay_ms(CONVERSION_MS);

        let mut raw = [0u8; 6];
        for _ in 0..=BUSY_RETRIES {
            self.i2c
                .read(ADDRESS, &mut raw)
                .map_err(|_| SensorError::BusError)?;
            if raw[0] & STATUS_BUSY == 0 {
                return Ok(decode(&raw));
            }
            self.delay.delay_ms(BUSY_POLL_MS);
        }
        Err(SensorError::Busy)
    }

    fn status(&mut self) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .read(ADDRESS, &mut buf)
            .map_err(|_| SensorError::BusError)?;
        Ok(buf[0])
    }
}

/// Unpack the two 20-bit fields of a measurement frame.
pub fn decode(raw: &[u8; 6]) -> EnvironmentSample {
    let h20 = (u32::from(raw[1]) << 12) | (u32::from(raw[2]) << 4) | (u32::from(raw[3]) >> 4);
    let t20 = ((u32::from(raw[3]) & 0x0F) << 16) | (u32::from(raw[4]) << 8) | u32::from(raw[5]);
    EnvironmentSample {
        temperature_c: t20 as f32 * 200.0 / FULL_SCALE - 50.0,
        relative_humidity_pct: h20 as f32 * 100.0 / FULL_SCALE,
    }
}
