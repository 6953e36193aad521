//! Acknowledgement transport
//!
//! Completion acknowledgements echo the command's original message bytes to
//! the host. The transport behind it (UART on the vehicle) lives in the
//! firmware crate.

use core::fmt;

use heapless::Vec;

use super::Payload;

/// Sink for completion acknowledgements
pub trait AckTransport {
    type Error;

    /// Send one acknowledgement carrying `payload`.
    fn send_ack(&mut self, payload: &[u8]) -> Result<(), Self::Error>;
}

/// Maximum acknowledgements remembered by [`MockAckTransport`]
pub const MOCK_ACK_CAPACITY: usize = 16;

/// Error raised by [`MockAckTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAckError {
    /// Failure injected with [`MockAckTransport::set_fail`]
    Injected,
    /// Recorded acknowledgement buffer is full
    Full,
}

impl fmt::Display for MockAckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockAckError::Injected => write!(f, "Injected failure"),
            MockAckError::Full => write!(f, "Ack buffer full"),
        }
    }
}

/// Recording transport for tests
#[derive(Debug, Default)]
pub struct MockAckTransport {
    sent: Vec<Payload, MOCK_ACK_CAPACITY>,
    fail: bool,
}

impl MockAckTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail.
    pub fn set_fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    /// Payload of the `index`-th acknowledgement
    pub fn sent(&self, index: usize) -> Option<&[u8]> {
        self.sent.get(index).map(|p| p.as_slice())
    }
}

impl AckTransport for MockAckTransport {
    type Error = MockAckError;

    fn send_ack(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockAckError::Injected);
        }
        let payload = Payload::from_slice(payload).map_err(|_| MockAckError::Full)?;
        self.sent.push(payload).map_err(|_| MockAckError::Full)
    }
}
