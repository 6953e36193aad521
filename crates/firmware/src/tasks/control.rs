//! Control task
//!
//! Runs one [`ControlLoop`] tick every 20 ms (50 Hz):
//!
//! 1. Fire the ultrasonic trigger if the ranger's spacing allows it
//! 2. Read a [`RawSensorFrame`] from the vehicle and attach the latest echo
//! 3. Update estimates, then run the executor with the command queue locked
//! 4. Hand the directive to the vehicle
//! 5. Send any acknowledgements the executor released
//!
//! Errors from the trigger pin or the ack transport are logged and the loop
//! continues.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use mdp_car_core::command::{
    AckTransport, CommandQueue, ExecutorError, ExecutorEvent, MotionDirective, TickOutput,
};
use mdp_car_core::control::{ControlLoop, RawSensorFrame};
use mdp_car_core::sensors::ImuBias;
use mdp_car_core::traits::TimeSource;

use crate::core::traits::SharedState;
use crate::devices::UltrasonicSensor;
use crate::platform::PlatformError;

/// Control period (ms)
pub const CONTROL_PERIOD_MS: u64 = 20;

/// Vehicle-side sensors and actuators
pub trait VehicleIo {
    /// Read IR, IMU, magnetometer and odometry for this tick.
    ///
    /// `echo` is filled in by the task.
    fn read_frame(&mut self) -> RawSensorFrame;

    /// Drive the motors and steering.
    ///
    /// `staged` is the next queued drive, available for pre-positioning.
    fn apply(&mut self, directive: &MotionDirective, staged: Option<&MotionDirective>);
}

/// Control loop wired to its queue, vehicle, ack link and ultrasonic sensor
pub struct ControlTask<'a, T, Q, V, A, P, D>
where
    T: TimeSource,
    Q: SharedState<CommandQueue>,
    V: VehicleIo,
    A: AckTransport<Error = PlatformError>,
    P: OutputPin,
    D: DelayNs,
{
    control: ControlLoop,
    queue: &'a Q,
    vehicle: V,
    acks: A,
    ultrasonic: UltrasonicSensor<'a, P, D>,
    time: T,
    ack_failures: u32,
}

impl<'a, T, Q, V, A, P, D> ControlTask<'a, T, Q, V, A, P, D>
where
    T: TimeSource,
    Q: SharedState<CommandQueue>,
    V: VehicleIo,
    A: AckTransport<Error = PlatformError>,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(
        control: ControlLoop,
        queue: &'a Q,
        vehicle: V,
        acks: A,
        ultrasonic: UltrasonicSensor<'a, P, D>,
        time: T,
    ) -> Self {
        Self {
            control,
            queue,
            vehicle,
            acks,
            ultrasonic,
            time,
            ack_failures: 0,
        }
    }

    /// Calibrate the IMU and take the current heading as zero.
    ///
    /// The vehicle must be at rest.
    pub fn start(&mut self, calibration_samples: u16) -> ImuBias {
        let vehicle = &mut self.vehicle;
        let bias = self.control.calibrate(calibration_samples, || {
            let frame = vehicle.read_frame();
            (frame.gyro_z_dps, frame.accel_g)
        });
        crate::log_info!("IMU bias: gyro_z {} dps", bias.gyro_z);

        let frame = self.vehicle.read_frame();
        let reference = self.control.init_heading(frame.mag_xy);
        crate::log_info!("Heading reference {} deg", reference);
        bias
    }

    /// Run one control period.
    pub fn step(&mut self) -> TickOutput {
        let now_ms = self.time.now_ms();

        if let Err(e) = self
            .ultrasonic
            .fire_if_due(self.control.conditioner_mut().ultrasonic(), now_ms)
        {
            crate::log_warn!("Ultrasonic trigger failed: {}", e.as_str());
        }

        let mut frame = self.vehicle.read_frame();
        frame.echo = self.ultrasonic.take_pulse();

        let input = self.control.update_estimates(now_ms, &frame);
        let control = &mut self.control;
        let output = self.queue.with_mut(|queue| control.execute(&input, queue));

        for event in output.events.iter() {
            log_event(event);
        }
        self.vehicle.apply(&output.directive, output.staged.as_ref());

        if let Err(ExecutorError::Ack(e)) = self.control.executor_mut().flush_acks(&mut self.acks) {
            self.ack_failures = self.ack_failures.saturating_add(1);
            crate::log_error!("Acknowledgement failed: {}", e.as_str());
        }

        output
    }

    /// Stop the running segment and acknowledge it.
    ///
    /// Queued commands are left in place and start on the next step.
    pub fn abort(&mut self) {
        if let Some(cmd) = self.control.executor().active() {
            crate::log_warn!("Aborting {}", cmd.op_type.as_str());
        }
        if let Err(ExecutorError::Ack(e)) = self.control.executor_mut().abort(&mut self.acks) {
            self.ack_failures = self.ack_failures.saturating_add(1);
            crate::log_error!("Acknowledgement failed: {}", e.as_str());
        }
        let stop = MotionDirective::STOP;
        self.vehicle.apply(&stop, None);
    }

    /// Run forever at [`CONTROL_PERIOD_MS`].
    #[cfg(feature = "embassy")]
    pub async fn run(mut self) {
        use embassy_time::{Duration, Ticker};

        crate::log_info!("Control task started");
        let mut ticker = Ticker::every(Duration::from_millis(CONTROL_PERIOD_MS));
        loop {
            self.step();
            ticker.next().await;
        }
    }

    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    pub fn vehicle(&self) -> &V {
        &self.vehicle
    }

    pub fn vehicle_mut(&mut self) -> &mut V {
        &mut self.vehicle
    }

    pub fn acks(&self) -> &A {
        &self.acks
    }

    pub fn acks_mut(&mut self) -> &mut A {
        &mut self.acks
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    /// Flushes that reported a transport error
    pub fn ack_failures(&self) -> u32 {
        self.ack_failures
    }
}

fn log_event(event: &ExecutorEvent) {
    match *event {
        ExecutorEvent::SegmentStarted { op_type, dist_type } => {
            crate::log_debug!("Started {} ({})", op_type.as_str(), dist_type.as_str());
        }
        ExecutorEvent::SegmentCompleted {
            op_type,
            distance_cm,
            turned_deg,
        } => {
            crate::log_info!(
                "Completed {}: {} cm, {} deg",
                op_type.as_str(),
                distance_cm,
                turned_deg
            );
        }
        ExecutorEvent::SegmentCoalesced { op_type } => {
            crate::log_debug!("Continued into next {}", op_type.as_str());
        }
        ExecutorEvent::Marker => crate::log_info!("Marker"),
        ExecutorEvent::DistanceTrackingStarted => crate::log_info!("Distance tracking started"),
        ExecutorEvent::DistanceTrackingStopped { total_cm } => {
            crate::log_info!("Distance tracking stopped: {} cm", total_cm);
        }
    }
}
