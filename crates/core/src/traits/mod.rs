//! Platform seams of the core crate.
//!
//! Only time is abstracted here. Pins and microsecond delays come from
//! `embedded_hal`, acknowledgements from [`crate::command::AckTransport`].
//! Embassy implementations live in the firmware crate; mocks live next to
//! the traits so host tests need no feature flags.

pub mod time;

pub use time::{MockTime, TimeSource};
