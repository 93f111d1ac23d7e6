//! Application core: pure domain logic, zero I/O.
//!
//! Business rules for the PetFeeder: the control loop, startup
//! classification, domain values and outbound events.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod model;
pub mod ports;
pub mod service;
pub mod startup;
