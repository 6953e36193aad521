//! Mock platform implementations for host tests

pub mod uart;

pub use uart::MockUart;
