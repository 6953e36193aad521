#![cfg_attr(not(test), no_std)]

//! mdp_car_firmware - Embassy integration for the mdp_car control core
//!
//! This crate wires the platform-independent estimation and command logic in
//! `mdp_car_core` to hardware: shared state, time, UART acknowledgements, the
//! ultrasonic trigger/echo path and the 50 Hz control task.
//!
//! # Design Principles
//!
//! - **Embassy tasks**: the control loop runs on an Embassy ticker
//! - **Platform traits**: UART and time are traits with mock implementations
//! - **defmt logging**: `log_*!` macros map to defmt on target, stdout in tests

// Platform abstraction layer
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Firmware-side core: logging, shared state, and re-exports from mdp_car_core
pub mod core;

// Command inbox and acknowledgement link
pub mod communication;

// Embassy tasks
pub mod tasks;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!, log_trace!)
// are exported at crate root via #[macro_export] in core::logging
