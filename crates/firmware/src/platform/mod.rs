//! Platform abstraction layer
//!
//! Hardware-facing traits, error types and their host mocks. Board bring-up
//! and peripheral initialization live in the application binary.

pub mod error;
pub mod mock;
pub mod traits;

#[cfg(feature = "embassy")]
pub mod time;

pub use error::{GpioError, PlatformError, Result, UartError};
pub use mock::MockUart;
#[cfg(feature = "embassy")]
pub use time::EmbassyTime;
pub use traits::{UartConfig, UartInterface};
