//! Mock UART implementation for testing

use core::cell::RefCell;

use heapless::Vec;

use crate::platform::{
    error::UartError,
    traits::{UartConfig, UartInterface},
    Result,
};

/// Capacity of each mock buffer
pub const MOCK_UART_BUFFER: usize = 256;

/// In-memory UART
///
/// Records transmitted bytes. Writes can be made to fail or to accept only
/// part of the data; a full buffer fails the write.
///
/// # Example
///
/// ```
/// use mdp_car_firmware::platform::mock::MockUart;
/// use mdp_car_firmware::platform::traits::UartInterface;
///
/// let mut uart = MockUart::new(Default::default());
/// uart.write(b"Hello").unwrap();
/// assert_eq!(uart.tx_buffer().as_slice(), b"Hello");
/// ```
#[derive(Debug)]
pub struct MockUart {
    config: UartConfig,
    tx_buffer: RefCell<Vec<u8, MOCK_UART_BUFFER>>,
    fail_writes: bool,
    write_limit: Option<usize>,
}

impl MockUart {
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            tx_buffer: RefCell::new(Vec::new()),
            fail_writes: false,
            write_limit: None,
        }
    }

    /// Transmitted data (for test verification)
    pub fn tx_buffer(&self) -> Vec<u8, MOCK_UART_BUFFER> {
        self.tx_buffer.borrow().clone()
    }

    pub fn clear_tx_buffer(&mut self) {
        self.tx_buffer.borrow_mut().clear();
    }

    /// Make every write fail with `UartError::WriteFailed`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Accept at most `limit` bytes per write.
    pub fn set_write_limit(&mut self, limit: Option<usize>) {
        self.write_limit = limit;
    }

    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }
}

impl UartInterface for MockUart {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.fail_writes {
            return Err(UartError::WriteFailed.into());
        }
        let count = self.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
        self.tx_buffer
            .borrow_mut()
            .extend_from_slice(&data[..count])
            .map_err(|_| UartError::WriteFailed)?;
        Ok(count)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformError;

    #[test]
    fn test_mock_uart_write() {
        let mut uart = MockUart::new(UartConfig::default());
        let written = uart.write(b"Hello, World!").unwrap();
        assert_eq!(written, 13);
        assert_eq!(uart.tx_buffer().as_slice(), b"Hello, World!");
    }

    #[test]
    fn test_mock_uart_full_buffer_fails_write() {
        let mut uart = MockUart::new(UartConfig::default());
        let block = [b'x'; MOCK_UART_BUFFER];
        assert_eq!(uart.write(&block).unwrap(), MOCK_UART_BUFFER);

        assert_eq!(
            uart.write(b"y"),
            Err(PlatformError::Uart(UartError::WriteFailed))
        );
        uart.clear_tx_buffer();
        assert_eq!(uart.write(b"y").unwrap(), 1);
    }

    #[test]
    fn test_mock_uart_failure_modes() {
        let mut uart = MockUart::new(UartConfig::default());
        uart.set_fail_writes(true);
        assert_eq!(
            uart.write(b"x"),
            Err(PlatformError::Uart(UartError::WriteFailed))
        );

        uart.set_fail_writes(false);
        uart.set_write_limit(Some(2));
        assert_eq!(uart.write(b"abcd").unwrap(), 2);
        assert_eq!(uart.tx_buffer().as_slice(), b"ab");
        assert_eq!(uart.baud_rate(), 115200);
    }
}
