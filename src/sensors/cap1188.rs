//! CAP1188 8-channel capacitive touch controller (I²C, address 0x29).
//!
//! The Sensor Input Status register holds one bit per touched pad.  The
//! controller latches touches until the INT bit of the Main Control
//! register is cleared, so every read that reports a touch is followed
//! by an INT clear.

use embedded_hal::i2c::I2c;

use crate::error::SensorError;
use crate::gesture::PadMask;

pub const ADDRESS: u8 = 0x29;

const REG_MAIN_CONTROL: u8 = 0x00;
const REG_SENSOR_INPUT_STATUS: u8 = 0x03;
const REG_MULTIPLE_TOUCH_CONFIG: u8 = 0x2A;
const REG_SENSOR_LED_LINKING: u8 = 0x72;
const REG_PRODUCT_ID: u8 = 0xFD;
const REG_MANUFACTURER_ID: u8 = 0xFE;

const PRODUCT_ID: u8 = 0x50;
const MANUFACTURER_ID: u8 = 0x5D;
const MAIN_CONTROL_INT: u8 = 0x01;

pub struct Cap1188<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Cap1188<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Verify the chip identity, allow simultaneous touches and link each
    /// pad to its on-board LED.
    pub fn init(&mut self) -> Result<(), SensorError> {
        let product = self
            .read_register(REG_PRODUCT_ID)
            .map_err(|_| SensorError::NotDetected)?;
        let manufacturer = self
            .read_register(REG_MANUFACTURER_ID)
            .map_err(|_| SensorError::NotDetected)?;
        if product != PRODUCT_ID || manufacturer != MANUFACTURER_ID {
            return Err(SensorError::NotDetected);
        }

        self.write_register(REG_MULTIPLE_TOUCH_CONFIG, 0x00)?;
        self.write_register(REG_SENSOR_LED_LINKING, 0xFF)?;
        Ok(())
    }

    /// Currently touched pads.
    pub fn touched(&mut self) -> Result<PadMask, SensorError> {
        let status = self.read_register(REG_SENSOR_INPUT_STATUS)?;
        if status != 0 {
            let main = self.read_register(REG_MAIN_CONTROL)?;
            self.write_register(REG_MAIN_CONTROL, main & !MAIN_CONTROL_INT)?;
        }
        Ok(PadMask::from(status))
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[reg], &mut buf)
            .map_err(|_| SensorError::BusError)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(ADDRESS, &[reg, value])
            .map_err(|_| SensorError::BusError)
    }
}
