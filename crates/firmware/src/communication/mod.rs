//! Host link
//!
//! - [`inbox`]: parsed commands into the shared queue
//! - [`ack`]: completion acknowledgements back over UART
//!
//! Message parsing itself happens before commands reach the inbox.

pub mod ack;
pub mod inbox;

pub use ack::{UartAckTransport, ACK_TERMINATOR};
pub use inbox::CommandInbox;
