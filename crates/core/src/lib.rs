//! mdp_car_core - Pure no_std estimation and command logic for the mdp_car vehicle
//!
//! This crate contains platform-agnostic algorithms and types
//! that can be tested on host without any feature flags or embassy dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Platform services injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)
//! - [`config`]: Estimator and sensor-curve constants
//! - [`filter`]: Scalar Kalman filter and exponential low-pass filter
//! - [`sensors`]: Sensor snapshot, bias calibration, raw-sample conditioning
//! - [`estimation`]: Distance and heading estimators, angle arithmetic
//! - [`command`]: Motion commands, command queue, executor
//! - [`control`]: Per-tick glue from raw samples to actuator directives

#![no_std]

pub mod command;
pub mod config;
pub mod control;
pub mod estimation;
pub mod filter;
pub mod sensors;
pub mod traits;
