//! Sensor drivers on the shared I²C bus.
//!
//! Both drivers are generic over [`embedded_hal::i2c::I2c`], so on the
//! device each one receives a `MutexDevice` handle onto the same
//! `I2cDriver`, and in tests a scripted mock bus.

pub mod aht20;
pub mod cap1188;
