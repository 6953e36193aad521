//! Platform interface traits

pub mod uart;

pub use uart::{UartConfig, UartInterface};
