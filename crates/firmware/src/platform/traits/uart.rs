//! UART interface trait
//!
//! Transmit side of the host link. Acknowledgements are the only traffic
//! the firmware sends; inbound messages are parsed before they reach the
//! command inbox.

use crate::platform::Result;

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baud_rate: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self { baud_rate: 115200 }
    }
}

/// Blocking UART transmitter
///
/// # Safety Invariants
///
/// - UART peripheral must be initialized before use
/// - Only one owner per UART peripheral instance
pub trait UartInterface {
    /// Write data to UART
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart` if the write operation fails.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Block until pending transmit data has been sent.
    fn flush(&mut self) -> Result<()>;
}
