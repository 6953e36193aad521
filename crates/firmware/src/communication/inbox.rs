//! Command inbox
//!
//! Producer side of the command queue. The message receiver (interrupt or
//! task) hands parsed commands to [`CommandInbox::submit`]; the control task
//! consumes them from the same shared queue.

use core::sync::atomic::{AtomicU32, Ordering};

use mdp_car_core::command::{Command, CommandQueue};

use crate::core::traits::SharedState;

/// Enqueue side of a shared [`CommandQueue`]
pub struct CommandInbox<'a, S: SharedState<CommandQueue>> {
    queue: &'a S,
    dropped: AtomicU32,
}

impl<'a, S: SharedState<CommandQueue>> CommandInbox<'a, S> {
    pub fn new(queue: &'a S) -> Self {
        Self {
            queue,
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue a parsed command.
    ///
    /// A full queue hands the command back and counts it as dropped.
    pub fn submit(&self, cmd: Command) -> Result<(), Command> {
        let op = cmd.op_type;
        match self.queue.with_mut(|q| q.enqueue(cmd)) {
            Ok(()) => {
                crate::log_trace!("queued {}", op.as_str());
                Ok(())
            }
            Err(rejected) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                crate::log_warn!("command queue full, dropped {}", op.as_str());
                Err(rejected)
            }
        }
    }

    /// Commands waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.with(|q| q.len())
    }

    /// Commands rejected because the queue was full
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockState;
    use mdp_car_core::command::{DistType, Direction, QUEUE_CAPACITY};

    #[test]
    fn test_submit_enqueues_in_order() {
        let queue = MockState::new(CommandQueue::new());
        let inbox = CommandInbox::new(&queue);

        inbox.submit(Command::info_marker()).unwrap();
        inbox
            .submit(Command::drive(Direction::Forward, 50, 0.0, DistType::Target, 10.0))
            .unwrap();

        assert_eq!(inbox.pending(), 2);
        let head = queue.with_mut(|q| q.pop()).unwrap();
        assert!(!head.is_drive_class());
    }

    #[test]
    fn test_full_queue_counts_drop() {
        let queue = MockState::new(CommandQueue::new());
        let inbox = CommandInbox::new(&queue);
        for _ in 0..QUEUE_CAPACITY {
            inbox.submit(Command::info_marker()).unwrap();
        }

        let rejected = inbox.submit(Command::info_dist()).unwrap_err();
        assert!(!rejected.is_drive_class());
        assert_eq!(inbox.dropped(), 1);
        assert_eq!(inbox.pending(), QUEUE_CAPACITY);
    }
}
