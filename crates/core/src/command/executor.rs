//! Command Executor
//!
//! Platform-agnostic state machine that takes commands from the head of the
//! [`CommandQueue`], runs drive segments until their stop condition holds and
//! hands finished commands back for acknowledgement.
//!
//! Per tick:
//! 1. Advance the active segment (fused distance for `Drive`, accumulated
//!    heading change for `TurnInPlace`).
//! 2. If its stop condition holds, complete it. A next command that
//!    type-matches in the same direction starts on the same tick, carrying
//!    the current velocity (coalescing). Otherwise the tick emits a stop.
//! 3. When idle, complete immediate commands at the head and start the next
//!    drive-class command.
//!
//! Acknowledgements are buffered and sent by
//! [`flush_acks`](CommandExecutor::flush_acks), so a failing transport never
//! loses the tick's directive. Flush every tick: a full buffer holds back
//! further completions until it drains.

use core::fmt;

use heapless::{Deque, Vec};

use super::ack::AckTransport;
use super::queue::CommandQueue;
use super::{Command, DistType, MotionDirective, OpType};
use crate::config::EstimatorConfig;
use crate::estimation::{angle_diff_180, DistanceEstimator};
use crate::sensors::{IrChannel, SensorSample};

/// Maximum events emitted per tick
pub const MAX_EXECUTOR_EVENTS: usize = 8;

/// Completed commands waiting for acknowledgement
pub const PENDING_ACK_CAPACITY: usize = 8;

/// Executor state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExecutorState {
    /// No segment running
    #[default]
    Idle,
    /// A drive-class segment is running
    Running(OpType),
}

/// Events for logging and telemetry
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExecutorEvent {
    /// A drive-class command became the active segment
    SegmentStarted { op_type: OpType, dist_type: DistType },
    /// The active segment reached its stop condition
    SegmentCompleted {
        op_type: OpType,
        /// Fused distance (cm), zero for turns
        distance_cm: f32,
        /// Net signed heading change (deg), zero for drives
        turned_deg: f32,
    },
    /// The next segment continues without stopping
    SegmentCoalesced { op_type: OpType },
    /// An `InfoMarker` reached the head of the queue
    Marker,
    /// Accumulated-distance tracking switched on
    DistanceTrackingStarted,
    /// Accumulated-distance tracking switched off
    DistanceTrackingStopped { total_cm: f32 },
}

/// Per-tick inputs besides the sensor snapshot
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct TickInput {
    /// Time since the previous tick (ms)
    pub dt_ms: f32,
    /// Acceleration along the vehicle's forward axis (cm/ms²)
    pub forward_accel: f32,
    /// Cumulative wheel-odometry path length (cm)
    pub odometry_cm: f32,
}

/// Result of one executor tick
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutput {
    /// What the actuators should do now
    pub directive: MotionDirective,
    /// Directive of the next drive-class command, for pre-staging
    pub staged: Option<MotionDirective>,
    /// Fused distance of the current (or last) drive segment (cm)
    pub distance_cm: f32,
    /// Heading the tick was evaluated against (deg)
    pub heading_deg: f32,
    pub events: Vec<ExecutorEvent, MAX_EXECUTOR_EVENTS>,
}

/// Executor errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutorError<E> {
    /// Acknowledgement transport failed; the command was released anyway
    Ack(E),
}

impl<E: fmt::Display> fmt::Display for ExecutorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorError::Ack(e) => write!(f, "Acknowledgement failed: {}", e),
        }
    }
}

#[derive(Debug)]
struct ActiveSegment {
    command: Command,
    /// Odometry reading when the segment started
    odometry_origin: f32,
    last_heading: f32,
    /// Net signed rotation since the segment started
    turned_deg: f32,
}

/// Drives queued commands to completion
#[derive(Debug)]
pub struct CommandExecutor {
    distance: DistanceEstimator,
    active: Option<ActiveSegment>,
    pending_acks: Deque<Command, PENDING_ACK_CAPACITY>,
    /// Sum of completed drive distances while tracking is on
    tracked_distance: Option<f32>,
}

impl CommandExecutor {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            distance: DistanceEstimator::new(config),
            active: None,
            pending_acks: Deque::new(),
            tracked_distance: None,
        }
    }

    pub fn state(&self) -> ExecutorState {
        match &self.active {
            Some(seg) => ExecutorState::Running(seg.command.op_type),
            None => ExecutorState::Idle,
        }
    }

    /// Command of the running segment
    pub fn active(&self) -> Option<&Command> {
        self.active.as_ref().map(|seg| &seg.command)
    }

    pub fn distance_estimator(&self) -> &DistanceEstimator {
        &self.distance
    }

    /// Accumulated distance (cm), `None` while tracking is off
    pub fn tracked_distance(&self) -> Option<f32> {
        self.tracked_distance
    }

    /// Number of completed commands awaiting acknowledgement
    pub fn pending_acks(&self) -> usize {
        self.pending_acks.len()
    }

    /// Abandon the running segment and stop tracking.
    ///
    /// Completions already buffered are flushed first, then the abandoned
    /// command is acknowledged if it asked for it. Returns the number of
    /// acknowledgements sent, or the first transport error.
    pub fn abort<T: AckTransport>(
        &mut self,
        transport: &mut T,
    ) -> Result<usize, ExecutorError<T::Error>> {
        let earlier = self.flush_acks(transport);
        if let Some(seg) = self.active.take() {
            // Buffer is empty after the flush
            self.release(seg.command);
        }
        self.tracked_distance = None;
        self.distance.reset(0.0);
        let aborted = self.flush_acks(transport);

        match (earlier, aborted) {
            (Ok(a), Ok(b)) => Ok(a + b),
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    /// Run one control tick.
    pub fn tick(
        &mut self,
        queue: &mut CommandQueue,
        input: &TickInput,
        sample: &SensorSample,
    ) -> TickOutput {
        let mut events = Vec::new();

        if let Some(seg) = self.active.as_mut() {
            match seg.command.op_type {
                OpType::Drive => {
                    let accel = input.forward_accel * seg.command.direction.travel_sign();
                    let motor = input.odometry_cm - seg.odometry_origin;
                    self.distance.get_distance_cm(input.dt_ms, accel, motor);
                }
                _ => {
                    seg.turned_deg += angle_diff_180(sample.heading, seg.last_heading);
                    seg.last_heading = sample.heading;
                }
            }
        }

        let finished = match &self.active {
            Some(seg) => {
                self.can_release(&seg.command)
                    && stop_condition_met(seg, self.distance.distance(), sample)
            }
            None => false,
        };

        if finished {
            self.complete_active(queue, input, sample, &mut events);
        } else if self.active.is_none() {
            self.advance_queue(queue, input, sample, &mut events);
        }

        let (directive, staged) = match &self.active {
            Some(seg) => (
                seg.command.directive(),
                queue.peek_next_drive().map(Command::directive),
            ),
            None => (MotionDirective::STOP, None),
        };

        TickOutput {
            directive,
            staged,
            distance_cm: self.distance.distance(),
            heading_deg: sample.heading,
            events,
        }
    }

    /// Acknowledge every completed command, oldest first.
    ///
    /// Each command is released whether or not its acknowledgement went out.
    /// Returns the number sent, or the first transport error.
    pub fn flush_acks<T: AckTransport>(
        &mut self,
        transport: &mut T,
    ) -> Result<usize, ExecutorError<T::Error>> {
        let mut sent = 0;
        let mut first_error = None;

        while let Some(cmd) = self.pending_acks.pop_front() {
            match CommandQueue::finalize(cmd, transport) {
                Ok(()) => sent += 1,
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(ExecutorError::Ack(e)),
            None => Ok(sent),
        }
    }

    fn can_release(&self, cmd: &Command) -> bool {
        !cmd.should_acknowledge || !self.pending_acks.is_full()
    }

    fn release(&mut self, cmd: Command) {
        if cmd.should_acknowledge {
            // Room checked by can_release
            let _ = self.pending_acks.push_back(cmd);
        }
    }

    fn start(
        &mut self,
        command: Command,
        initial_velocity: f32,
        input: &TickInput,
        sample: &SensorSample,
        events: &mut Vec<ExecutorEvent, MAX_EXECUTOR_EVENTS>,
    ) {
        self.distance.reset(initial_velocity);
        emit(
            events,
            ExecutorEvent::SegmentStarted {
                op_type: command.op_type,
                dist_type: command.dist_type,
            },
        );
        self.active = Some(ActiveSegment {
            command,
            odometry_origin: input.odometry_cm,
            last_heading: sample.heading,
            turned_deg: 0.0,
        });
    }

    fn complete_active(
        &mut self,
        queue: &mut CommandQueue,
        input: &TickInput,
        sample: &SensorSample,
        events: &mut Vec<ExecutorEvent, MAX_EXECUTOR_EVENTS>,
    ) {
        let Some(seg) = self.active.take() else {
            return;
        };

        let op_type = seg.command.op_type;
        let (distance_cm, turned_deg) = match op_type {
            OpType::Drive => (self.distance.distance(), 0.0),
            _ => (0.0, seg.turned_deg),
        };
        if op_type == OpType::Drive {
            if let Some(total) = self.tracked_distance.as_mut() {
                *total += distance_cm;
            }
        }
        emit(
            events,
            ExecutorEvent::SegmentCompleted {
                op_type,
                distance_cm,
                turned_deg,
            },
        );

        let coalesce = queue.peek().is_some_and(|next| {
            next.is_drive_class()
                && next.type_match(&seg.command)
                && next.direction == seg.command.direction
        });
        let carried_velocity = self.distance.velocity();
        self.release(seg.command);

        if coalesce {
            if let Some(next) = queue.pop() {
                emit(events, ExecutorEvent::SegmentCoalesced { op_type: next.op_type });
                self.start(next, carried_velocity, input, sample, events);
            }
        }
    }

    fn advance_queue(
        &mut self,
        queue: &mut CommandQueue,
        input: &TickInput,
        sample: &SensorSample,
        events: &mut Vec<ExecutorEvent, MAX_EXECUTOR_EVENTS>,
    ) {
        loop {
            if events.is_full() {
                break;
            }
            let drive_class = match queue.peek() {
                Some(head) if self.can_release(head) => head.is_drive_class(),
                _ => break,
            };
            let Some(cmd) = queue.pop() else {
                break;
            };

            if drive_class {
                self.start(cmd, 0.0, input, sample, events);
                break;
            }

            match cmd.op_type {
                OpType::InfoDist => self.toggle_tracking(events),
                OpType::InfoMarker => emit(events, ExecutorEvent::Marker),
                _ => {}
            }
            self.release(cmd);
        }
    }

    fn toggle_tracking(&mut self, events: &mut Vec<ExecutorEvent, MAX_EXECUTOR_EVENTS>) {
        match self.tracked_distance.take() {
            Some(total_cm) => emit(events, ExecutorEvent::DistanceTrackingStopped { total_cm }),
            None => {
                self.tracked_distance = Some(0.0);
                emit(events, ExecutorEvent::DistanceTrackingStarted);
            }
        }
    }
}

/// A tick emits at most three segment events plus one per immediate command,
/// and immediates stop when the buffer is full.
fn emit(events: &mut Vec<ExecutorEvent, MAX_EXECUTOR_EVENTS>, event: ExecutorEvent) {
    let _ = events.push(event);
}

fn stop_condition_met(seg: &ActiveSegment, distance_cm: f32, sample: &SensorSample) -> bool {
    let cmd = &seg.command;
    let target = cmd.target_value;

    match cmd.op_type {
        OpType::TurnInPlace => libm::fabsf(seg.turned_deg) >= target,
        OpType::Drive => match cmd.dist_type {
            DistType::Target => distance_cm >= target,
            DistType::StopAway => sample.ultrasound_dist <= target,
            DistType::StopL => sample.ir(IrChannel::Left) >= target,
            DistType::StopR => sample.ir(IrChannel::Right) >= target,
            DistType::StopLLess => sample.ir(IrChannel::Left) <= target,
            DistType::StopRLess => sample.ir(IrChannel::Right) <= target,
        },
        OpType::InfoDist | OpType::InfoMarker => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Direction, MockAckTransport};

    const DT: f32 = 20.0;

    fn executor() -> CommandExecutor {
        CommandExecutor::new(&EstimatorConfig::default())
    }

    fn forward(dist_type: DistType, target: f32) -> Command {
        Command::drive(Direction::Forward, 50, 0.0, dist_type, target)
    }

    fn input(odometry_cm: f32) -> TickInput {
        TickInput {
            dt_ms: DT,
            forward_accel: 0.0,
            odometry_cm,
        }
    }

    /// Tick with odometry advancing `step` cm per tick until the executor
    /// goes idle or `max_ticks` elapse. Returns the tick count.
    fn run_until_idle(
        exec: &mut CommandExecutor,
        queue: &mut CommandQueue,
        odometry: &mut f32,
        step: f32,
        max_ticks: usize,
    ) -> usize {
        let sample = SensorSample::new();
        for tick in 1..=max_ticks {
            *odometry += step;
            exec.tick(queue, &input(*odometry), &sample);
            if exec.state() == ExecutorState::Idle {
                return tick;
            }
        }
        max_ticks
    }

    #[test]
    fn test_idle_with_empty_queue() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        let out = exec.tick(&mut queue, &input(0.0), &SensorSample::new());

        assert_eq!(exec.state(), ExecutorState::Idle);
        assert_eq!(out.directive, MotionDirective::STOP);
        assert!(out.staged.is_none());
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_drive_starts_and_emits_directive() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        queue
            .enqueue(Command::drive(Direction::Forward, 70, 10.0, DistType::Target, 50.0))
            .unwrap();

        let out = exec.tick(&mut queue, &input(0.0), &SensorSample::new());

        assert_eq!(exec.state(), ExecutorState::Running(OpType::Drive));
        assert_eq!(out.directive.speed, 70);
        assert_eq!(out.directive.steer_angle, 10.0);
        assert_eq!(
            out.events[0],
            ExecutorEvent::SegmentStarted {
                op_type: OpType::Drive,
                dist_type: DistType::Target
            }
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_target_distance_completes_with_ack() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        let mut transport = MockAckTransport::new();
        queue
            .enqueue(forward(DistType::Target, 10.0).with_ack(b"FW010").unwrap())
            .unwrap();

        let sample = SensorSample::new();
        let mut odometry = 100.0;
        exec.tick(&mut queue, &input(odometry), &sample);

        // Odometry is relative to the segment start; the fused distance lags
        // it but must reach the target eventually.
        let ticks = run_until_idle(&mut exec, &mut queue, &mut odometry, 1.0, 500);
        assert!(ticks < 500, "never completed");
        assert!(exec.distance_estimator().distance() >= 10.0);

        assert_eq!(exec.pending_acks(), 1);
        assert_eq!(exec.flush_acks(&mut transport), Ok(1));
        assert_eq!(transport.sent(0), Some(&b"FW010"[..]));
        assert_eq!(exec.pending_acks(), 0);
    }

    #[test]
    fn test_completion_without_successor_emits_stop() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        queue.enqueue(forward(DistType::StopAway, 20.0)).unwrap();

        let mut sample = SensorSample::new();
        sample.ultrasound_dist = 80.0;
        let out = exec.tick(&mut queue, &input(0.0), &sample);
        assert!(!out.directive.is_stop());

        sample.ultrasound_dist = 19.5;
        let out = exec.tick(&mut queue, &input(0.0), &sample);
        assert_eq!(out.directive, MotionDirective::STOP);
        assert_eq!(exec.state(), ExecutorState::Idle);
        assert!(matches!(
            out.events[0],
            ExecutorEvent::SegmentCompleted {
                op_type: OpType::Drive,
                ..
            }
        ));
    }

    #[test]
    fn test_ir_stop_conditions() {
        let cases = [
            (DistType::StopL, [10.0, 50.0], [40.0, 50.0]),
            (DistType::StopR, [50.0, 10.0], [50.0, 40.0]),
            (DistType::StopLLess, [60.0, 10.0], [25.0, 10.0]),
            (DistType::StopRLess, [10.0, 60.0], [10.0, 25.0]),
        ];

        for (dist_type, before, after) in cases {
            let mut exec = executor();
            let mut queue = CommandQueue::new();
            queue.enqueue(forward(dist_type, 30.0)).unwrap();

            let mut sample = SensorSample::new();
            sample.ultrasound_dist = 100.0;
            sample.ir_dist = before;
            exec.tick(&mut queue, &input(0.0), &sample);
            exec.tick(&mut queue, &input(0.0), &sample);
            assert_eq!(
                exec.state(),
                ExecutorState::Running(OpType::Drive),
                "{} fired early",
                dist_type.as_str()
            );

            sample.ir_dist = after;
            exec.tick(&mut queue, &input(0.0), &sample);
            assert_eq!(
                exec.state(),
                ExecutorState::Idle,
                "{} did not fire",
                dist_type.as_str()
            );
        }
    }

    #[test]
    fn test_turn_in_place_accumulates_heading_across_seam() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        queue
            .enqueue(Command::turn_in_place(Direction::Forward, 40, 25.0, 90.0))
            .unwrap();

        let mut sample = SensorSample::new();
        sample.heading = 150.0;
        exec.tick(&mut queue, &input(0.0), &sample);
        assert_eq!(exec.state(), ExecutorState::Running(OpType::TurnInPlace));

        // 150 -> 170 -> -170 -> -150: 60 degrees so far
        for heading in [170.0, -170.0, -150.0] {
            sample.heading = heading;
            exec.tick(&mut queue, &input(0.0), &sample);
            assert_eq!(exec.state(), ExecutorState::Running(OpType::TurnInPlace));
        }

        sample.heading = -120.0;
        let out = exec.tick(&mut queue, &input(0.0), &sample);
        assert_eq!(exec.state(), ExecutorState::Idle);
        match out.events[0] {
            ExecutorEvent::SegmentCompleted { turned_deg, .. } => {
                assert!((turned_deg - 90.0).abs() < 1e-3, "got {}", turned_deg)
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_turn_ignores_heading_jitter() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        queue
            .enqueue(Command::turn_in_place(Direction::Forward, 40, 25.0, 90.0))
            .unwrap();

        let mut sample = SensorSample::new();
        exec.tick(&mut queue, &input(0.0), &sample);

        // Back-and-forth noise has no net rotation
        for i in 0..200 {
            sample.heading = if i % 2 == 0 { 1.0 } else { 0.0 };
            exec.tick(&mut queue, &input(0.0), &sample);
            assert_eq!(exec.state(), ExecutorState::Running(OpType::TurnInPlace));
        }

        // A real turn, with the same jitter riding on it
        let mut heading = 0.0;
        let mut completed = None;
        for i in 0..100 {
            heading -= 2.0;
            sample.heading = heading + if i % 2 == 0 { 1.0 } else { 0.0 };
            let out = exec.tick(&mut queue, &input(0.0), &sample);
            if let Some(ExecutorEvent::SegmentCompleted { turned_deg, .. }) = out.events.first() {
                completed = Some(*turned_deg);
                break;
            }
        }

        let turned = completed.unwrap();
        assert!(turned <= -90.0 && turned > -94.0, "got {}", turned);
    }

    #[test]
    fn test_immediate_commands_complete_at_head() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        let mut transport = MockAckTransport::new();
        queue
            .enqueue(Command::info_marker().with_ack(b"MK").unwrap())
            .unwrap();
        queue.enqueue(Command::info_dist()).unwrap();
        queue.enqueue(forward(DistType::Target, 5.0)).unwrap();

        let out = exec.tick(&mut queue, &input(0.0), &SensorSample::new());

        assert_eq!(out.events[0], ExecutorEvent::Marker);
        assert_eq!(out.events[1], ExecutorEvent::DistanceTrackingStarted);
        assert!(matches!(out.events[2], ExecutorEvent::SegmentStarted { .. }));
        assert_eq!(exec.tracked_distance(), Some(0.0));
        assert_eq!(exec.flush_acks(&mut transport), Ok(1));
        assert_eq!(transport.sent(0), Some(&b"MK"[..]));
    }

    #[test]
    fn test_distance_tracking_accumulates_segments() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        queue.enqueue(Command::info_dist()).unwrap();
        queue.enqueue(forward(DistType::StopAway, 10.0)).unwrap();
        queue
            .enqueue(Command::drive(Direction::Backward, 50, 0.0, DistType::StopAway, 10.0))
            .unwrap();
        queue.enqueue(Command::info_dist()).unwrap();

        let mut sample = SensorSample::new();
        sample.ultrasound_dist = 100.0;
        let mut odometry = 0.0;
        let mut completed = 0.0;
        let mut total = None;

        for tick in 0..200 {
            odometry += 0.5;
            if tick % 20 == 19 {
                // Trip the current segment's stop condition for one tick
                sample.ultrasound_dist = 5.0;
            }
            let out = exec.tick(&mut queue, &input(odometry), &sample);
            sample.ultrasound_dist = 100.0;

            for event in out.events.iter() {
                match *event {
                    ExecutorEvent::SegmentCompleted { distance_cm, .. } => completed += distance_cm,
                    ExecutorEvent::DistanceTrackingStopped { total_cm } => total = Some(total_cm),
                    _ => {}
                }
            }
            if total.is_some() {
                break;
            }
        }

        let total = total.unwrap();
        assert!(completed > 0.0);
        assert!((total - completed).abs() < 1e-4);
        assert_eq!(exec.tracked_distance(), None);
    }

    #[test]
    fn test_coalesces_matching_segment() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        queue.enqueue(forward(DistType::StopAway, 30.0)).unwrap();
        queue.enqueue(forward(DistType::StopAway, 10.0)).unwrap();

        let mut sample = SensorSample::new();
        sample.ultrasound_dist = 100.0;
        exec.tick(&mut queue, &input(0.0), &sample);

        // Build up some velocity
        let accel_input = TickInput {
            dt_ms: DT,
            forward_accel: 1e-4,
            odometry_cm: 0.0,
        };
        for _ in 0..10 {
            exec.tick(&mut queue, &accel_input, &sample);
        }
        let velocity = exec.distance_estimator().velocity();
        assert!(velocity > 0.0);

        sample.ultrasound_dist = 25.0;
        let out = exec.tick(&mut queue, &input(0.0), &sample);

        assert!(!out.directive.is_stop());
        assert_eq!(exec.state(), ExecutorState::Running(OpType::Drive));
        assert_eq!(exec.active().unwrap().target_value, 10.0);
        assert_eq!(
            out.events[1],
            ExecutorEvent::SegmentCoalesced {
                op_type: OpType::Drive
            }
        );
        assert_eq!(exec.distance_estimator().velocity(), velocity);
        assert_eq!(exec.distance_estimator().distance(), 0.0);
    }

    #[test]
    fn test_no_coalesce_on_direction_change() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        queue.enqueue(forward(DistType::StopAway, 30.0)).unwrap();
        queue
            .enqueue(Command::drive(Direction::Backward, 50, 0.0, DistType::StopAway, 10.0))
            .unwrap();

        let mut sample = SensorSample::new();
        sample.ultrasound_dist = 100.0;
        exec.tick(&mut queue, &input(0.0), &sample);

        sample.ultrasound_dist = 25.0;
        let out = exec.tick(&mut queue, &input(0.0), &sample);
        assert_eq!(out.directive, MotionDirective::STOP);
        assert_eq!(queue.len(), 1);

        // Next tick picks up the reversed command from rest
        let out = exec.tick(&mut queue, &input(0.0), &sample);
        assert_eq!(out.directive.direction, Direction::Backward);
        assert_eq!(exec.distance_estimator().velocity(), 0.0);
    }

    #[test]
    fn test_staged_directive_skips_info_commands() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        queue.enqueue(forward(DistType::Target, 100.0)).unwrap();
        queue.enqueue(Command::info_marker()).unwrap();
        queue
            .enqueue(Command::turn_in_place(Direction::Forward, 35, -25.0, 90.0))
            .unwrap();

        let out = exec.tick(&mut queue, &input(0.0), &SensorSample::new());
        let staged = out.staged.unwrap();
        assert_eq!(staged.speed, 35);
        assert_eq!(staged.steer_angle, -25.0);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_flush_reports_transport_error() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        let mut transport = MockAckTransport::new();
        queue
            .enqueue(Command::info_marker().with_ack(b"A").unwrap())
            .unwrap();
        queue
            .enqueue(Command::info_marker().with_ack(b"B").unwrap())
            .unwrap();

        exec.tick(&mut queue, &input(0.0), &SensorSample::new());
        transport.set_fail(true);

        assert_eq!(
            exec.flush_acks(&mut transport),
            Err(ExecutorError::Ack(crate::command::MockAckError::Injected))
        );
        // Released regardless: nothing is sent twice
        assert_eq!(exec.pending_acks(), 0);
        transport.set_fail(false);
        assert_eq!(exec.flush_acks(&mut transport), Ok(0));
    }

    #[test]
    fn test_full_ack_buffer_holds_back_completions() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        for _ in 0..PENDING_ACK_CAPACITY + 2 {
            queue
                .enqueue(Command::info_marker().with_ack(b"M").unwrap())
                .unwrap();
        }

        exec.tick(&mut queue, &input(0.0), &SensorSample::new());
        assert_eq!(exec.pending_acks(), PENDING_ACK_CAPACITY);
        assert_eq!(queue.len(), 2);

        let mut transport = MockAckTransport::new();
        exec.flush_acks(&mut transport).unwrap();
        exec.tick(&mut queue, &input(0.0), &SensorSample::new());
        assert!(queue.is_empty());
        assert_eq!(exec.pending_acks(), 2);
    }

    #[test]
    fn test_abort_releases_segment() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        let mut transport = MockAckTransport::new();
        queue.enqueue(Command::info_dist()).unwrap();
        queue.enqueue(forward(DistType::Target, 100.0)).unwrap();
        exec.tick(&mut queue, &input(0.0), &SensorSample::new());

        assert_eq!(exec.abort(&mut transport), Ok(0));
        assert_eq!(exec.state(), ExecutorState::Idle);
        assert_eq!(exec.tracked_distance(), None);
        assert_eq!(exec.pending_acks(), 0);
        assert_eq!(transport.sent_count(), 0);
    }

    #[test]
    fn test_abort_acknowledges_active_command() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        let mut transport = MockAckTransport::new();
        queue
            .enqueue(Command::info_marker().with_ack(b"M").unwrap())
            .unwrap();
        queue
            .enqueue(forward(DistType::Target, 100.0).with_ack(b"FW100").unwrap())
            .unwrap();
        exec.tick(&mut queue, &input(0.0), &SensorSample::new());
        assert_eq!(exec.state(), ExecutorState::Running(OpType::Drive));

        assert_eq!(exec.abort(&mut transport), Ok(2));
        assert_eq!(exec.state(), ExecutorState::Idle);
        // Earlier completion goes out first
        assert_eq!(transport.sent(0), Some(&b"M"[..]));
        assert_eq!(transport.sent(1), Some(&b"FW100"[..]));
    }

    #[test]
    fn test_abort_after_buffered_completions_keeps_every_ack() {
        let mut exec = executor();
        let mut queue = CommandQueue::new();
        let mut transport = MockAckTransport::new();
        for _ in 0..PENDING_ACK_CAPACITY - 1 {
            queue
                .enqueue(Command::info_marker().with_ack(b"M").unwrap())
                .unwrap();
        }
        queue
            .enqueue(forward(DistType::Target, 100.0).with_ack(b"FW100").unwrap())
            .unwrap();
        exec.tick(&mut queue, &input(0.0), &SensorSample::new());
        assert_eq!(exec.state(), ExecutorState::Running(OpType::Drive));
        assert_eq!(exec.pending_acks(), PENDING_ACK_CAPACITY - 1);

        assert_eq!(exec.abort(&mut transport), Ok(PENDING_ACK_CAPACITY));
        assert_eq!(transport.sent(PENDING_ACK_CAPACITY - 1), Some(&b"FW100"[..]));
    }
}
