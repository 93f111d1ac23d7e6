//! PetFeeder firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alert;
pub mod app;
pub mod config;
pub mod dispense;
pub mod error;
pub mod gesture;
pub mod pins;
pub mod telemetry;
pub mod timer;

// Hardware-facing layers. Real peripheral access is cfg-gated inside;
// host builds get simulation stubs and mockable embedded-hal generics.
pub mod adapters;
pub mod drivers;
pub mod sensors;
