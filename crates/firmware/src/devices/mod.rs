//! Device drivers

pub mod ultrasonic;

pub use ultrasonic::{EchoCapture, UltrasonicSensor};
