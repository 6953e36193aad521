//! Motion commands
//!
//! Parsed command records, the pending-command queue, the acknowledgement
//! transport contract and the executor that decides when a drive segment is
//! finished.
//!
//! # Command classes
//!
//! - Drive-class: `Drive` and `TurnInPlace`. These move the vehicle and run
//!   until their stop condition holds.
//! - Immediate: `InfoDist` (toggle accumulated-distance tracking) and
//!   `InfoMarker`. These complete as soon as they reach the head of the queue.
//!
//! # Note
//!
//! Byte-level parsing of incoming messages is outside this crate; commands
//! arrive here already validated.

pub mod ack;
pub mod executor;
pub mod queue;

use core::fmt;

use heapless::Vec;

pub use ack::{AckTransport, MockAckError, MockAckTransport};
pub use executor::{
    CommandExecutor, ExecutorError, ExecutorEvent, ExecutorState, TickInput, TickOutput,
    MAX_EXECUTOR_EVENTS, PENDING_ACK_CAPACITY,
};
pub use queue::{CommandQueue, QUEUE_CAPACITY};

/// Maximum stored message length for acknowledgement echo
pub const MAX_PAYLOAD: usize = 32;

/// Highest accepted speed (percent)
pub const MAX_SPEED: u8 = 100;

/// Steering limit (degrees, symmetric)
pub const MAX_STEER_DEG: f32 = 25.0;

/// Original message bytes echoed back on completion
pub type Payload = Vec<u8, MAX_PAYLOAD>;

/// Command operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    /// Drive until the distance condition holds
    Drive,
    /// Toggle accumulated-distance tracking
    InfoDist,
    /// Arbitrary marker
    InfoMarker,
    /// Rotate on the spot until the heading has changed by the target
    TurnInPlace,
}

impl OpType {
    /// Short name for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            OpType::Drive => "DRIVE",
            OpType::InfoDist => "INFO_DIST",
            OpType::InfoMarker => "INFO_MARKER",
            OpType::TurnInPlace => "TURN_IN_PLACE",
        }
    }
}

/// Stop condition of a drive command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistType {
    /// Fused distance travelled reaches the target (cm)
    Target,
    /// Forward ultrasonic reading drops to the target (cm)
    StopAway,
    /// Left IR reading rises to the target (cm)
    StopL,
    /// Right IR reading rises to the target (cm)
    StopR,
    /// Left IR reading drops to the target (cm)
    StopLLess,
    /// Right IR reading drops to the target (cm)
    StopRLess,
}

impl DistType {
    /// Short name for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            DistType::Target => "TARGET",
            DistType::StopAway => "STOP_AWAY",
            DistType::StopL => "STOP_L",
            DistType::StopR => "STOP_R",
            DistType::StopLLess => "STOP_L_LESS",
            DistType::StopRLess => "STOP_R_LESS",
        }
    }
}

/// Motor direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Backward = -1,
    #[default]
    Stop = 0,
    Forward = 1,
}

impl Direction {
    /// Decode the wire value (-1, 0, 1)
    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Direction::Backward),
            0 => Some(Direction::Stop),
            1 => Some(Direction::Forward),
            _ => None,
        }
    }

    pub fn as_i8(self) -> i8 {
        self as i8
    }

    /// Sign applied to forward-axis readings so travel is positive
    pub fn travel_sign(self) -> f32 {
        match self {
            Direction::Backward => -1.0,
            _ => 1.0,
        }
    }
}

/// Actuator directive handed to the motor/steering controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDirective {
    pub direction: Direction,
    /// 0..=100
    pub speed: u8,
    /// Degrees, [-25, 25]
    pub steer_angle: f32,
}

impl MotionDirective {
    /// Motors stopped, wheels straight
    pub const STOP: Self = Self {
        direction: Direction::Stop,
        speed: 0,
        steer_angle: 0.0,
    };

    pub fn is_stop(&self) -> bool {
        self.direction == Direction::Stop || self.speed == 0
    }
}

impl Default for MotionDirective {
    fn default() -> Self {
        Self::STOP
    }
}

/// Command construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Acknowledgement payload longer than [`MAX_PAYLOAD`]
    PayloadTooLong(usize),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::PayloadTooLong(len) => {
                write!(f, "Payload too long: {} > {}", len, MAX_PAYLOAD)
            }
        }
    }
}

/// Parsed motion command
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub op_type: OpType,
    /// Stop condition (drive-class only)
    pub dist_type: DistType,
    pub direction: Direction,
    /// 0..=100
    pub speed: u8,
    /// Degrees, [-25, 25]
    pub steer_angle: f32,
    /// cm for distance conditions, degrees for `TurnInPlace`
    pub target_value: f32,
    /// Echo `payload` back when the command finishes
    pub should_acknowledge: bool,
    pub payload: Payload,
}

impl Command {
    fn with_op(op_type: OpType) -> Self {
        Self {
            op_type,
            dist_type: DistType::Target,
            direction: Direction::Stop,
            speed: 0,
            steer_angle: 0.0,
            target_value: 0.0,
            should_acknowledge: false,
            payload: Vec::new(),
        }
    }

    /// Drive command. Speed and steering are clamped to their ranges.
    pub fn drive(
        direction: Direction,
        speed: u8,
        steer_angle: f32,
        dist_type: DistType,
        target_value: f32,
    ) -> Self {
        Self {
            dist_type,
            direction,
            speed: speed.min(MAX_SPEED),
            steer_angle: steer_angle.clamp(-MAX_STEER_DEG, MAX_STEER_DEG),
            target_value,
            ..Self::with_op(OpType::Drive)
        }
    }

    /// Turn on the spot until the heading has changed by `target_deg`.
    pub fn turn_in_place(direction: Direction, speed: u8, steer_angle: f32, target_deg: f32) -> Self {
        Self {
            op_type: OpType::TurnInPlace,
            ..Self::drive(direction, speed, steer_angle, DistType::Target, target_deg)
        }
    }

    /// Toggle accumulated-distance tracking.
    pub fn info_dist() -> Self {
        Self::with_op(OpType::InfoDist)
    }

    pub fn info_marker() -> Self {
        Self::with_op(OpType::InfoMarker)
    }

    /// Request an acknowledgement that echoes `payload` on completion.
    pub fn with_ack(mut self, payload: &[u8]) -> Result<Self, CommandError> {
        self.payload =
            Vec::from_slice(payload).map_err(|_| CommandError::PayloadTooLong(payload.len()))?;
        self.should_acknowledge = true;
        Ok(self)
    }

    /// `Drive` or `TurnInPlace`
    pub fn is_drive_class(&self) -> bool {
        matches!(self.op_type, OpType::Drive | OpType::TurnInPlace)
    }

    /// Same operation and, for `Drive`, the same stop condition.
    pub fn type_match(&self, other: &Command) -> bool {
        if self.op_type != other.op_type {
            return false;
        }
        self.op_type != OpType::Drive || self.dist_type == other.dist_type
    }

    /// Actuator directive for this command
    pub fn directive(&self) -> MotionDirective {
        MotionDirective {
            direction: self.direction,
            speed: self.speed,
            steer_angle: self.steer_angle,
        }
    }
}
