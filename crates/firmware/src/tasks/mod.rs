//! Firmware tasks

pub mod control;

pub use control::{ControlTask, VehicleIo, CONTROL_PERIOD_MS};
