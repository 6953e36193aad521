//! UART acknowledgement transport
//!
//! A finished command is acknowledged by echoing its original message bytes
//! back to the host, terminated by a newline.

use mdp_car_core::command::AckTransport;

use crate::platform::{PlatformError, Result, UartError, UartInterface};

/// Line terminator appended to every acknowledgement
pub const ACK_TERMINATOR: &[u8] = b"\n";

/// Acknowledgement transport over a UART
pub struct UartAckTransport<U: UartInterface> {
    uart: U,
    sent: u32,
}

impl<U: UartInterface> UartAckTransport<U> {
    pub fn new(uart: U) -> Self {
        Self { uart, sent: 0 }
    }

    /// Number of acknowledgements written successfully
    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let written = self.uart.write(data)?;
        if written != data.len() {
            return Err(PlatformError::Uart(UartError::ShortWrite));
        }
        Ok(())
    }
}

impl<U: UartInterface> AckTransport for UartAckTransport<U> {
    type Error = PlatformError;

    fn send_ack(&mut self, payload: &[u8]) -> Result<()> {
        self.write_all(payload)?;
        self.write_all(ACK_TERMINATOR)?;
        self.uart.flush()?;
        self.sent = self.sent.wrapping_add(1);
        crate::log_debug!("ack sent ({} bytes)", payload.len());
        Ok(())
    }
}
