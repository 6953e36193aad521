//! Pending command queue
//!
//! Bounded FIFO in arrival order. The queue owns every command until it is
//! popped; the caller then owns it and must pass it to
//! [`CommandQueue::finalize`] once it is done.
//!
//! The queue itself is not synchronized. The firmware wraps it in a
//! critical-section cell so the receive interrupt can enqueue while the
//! control loop pops.

use heapless::Deque;

use super::ack::AckTransport;
use super::Command;

/// Maximum number of pending commands
pub const QUEUE_CAPACITY: usize = 16;

/// FIFO of pending commands
#[derive(Debug)]
pub struct CommandQueue {
    items: Deque<Command, QUEUE_CAPACITY>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    /// Empty queue (const fn for static initialization)
    pub const fn new() -> Self {
        Self {
            items: Deque::new(),
        }
    }

    /// Append a command. Returns the command back if the queue is full.
    pub fn enqueue(&mut self, cmd: Command) -> Result<(), Command> {
        self.items.push_back(cmd)
    }

    /// Remove and return the head.
    pub fn pop(&mut self) -> Option<Command> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&Command> {
        self.items.front()
    }

    /// First `Drive` or `TurnInPlace` command from the head, without removing it.
    pub fn peek_next_drive(&self) -> Option<&Command> {
        self.items.iter().find(|cmd| cmd.is_drive_class())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.is_full()
    }

    /// Drop all pending commands without acknowledging them.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Finish a popped command.
    ///
    /// Acknowledgeable commands echo their payload through `transport`; the
    /// command is released either way. Taking the command by value makes a
    /// second finalize of the same command impossible.
    pub fn finalize<T: AckTransport>(cmd: Command, transport: &mut T) -> Result<(), T::Error> {
        if cmd.should_acknowledge {
            transport.send_ack(&cmd.payload)?;
        }
        Ok(())
    }
}
