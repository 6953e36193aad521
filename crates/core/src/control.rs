//! Per-tick control context
//!
//! [`ControlLoop`] owns the sensor conditioner, the heading estimator, the
//! command executor and the shared [`SensorSample`]. The firmware gathers one
//! [`RawSensorFrame`] per tick and calls [`ControlLoop::tick`]:
//!
//! ```text
//! RawSensorFrame ─▶ SensorConditioner ─▶ SensorSample ─┬─▶ HeadingEstimator
//!                                                      └─▶ CommandExecutor ─▶ TickOutput
//! ```

use nalgebra::Vector3;

use crate::command::{CommandExecutor, CommandQueue, TickInput, TickOutput};
use crate::config::EstimatorConfig;
use crate::estimation::HeadingEstimator;
use crate::sensors::{EchoPulse, ImuBias, MagCalibration, SensorConditioner, SensorSample};

/// Raw readings gathered for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSensorFrame {
    /// IR ADC counts `[left, right]`
    pub ir: [u16; 2],
    /// Echo captured since the last tick, if any
    pub echo: Option<EchoPulse>,
    /// Accelerometer (g)
    pub accel_g: Vector3<f32>,
    /// Yaw rate (deg/s)
    pub gyro_z_dps: f32,
    /// Magnetometer X/Y (raw)
    pub mag_xy: [f32; 2],
    /// Cumulative wheel-odometry path length (cm)
    pub odometry_cm: f32,
}

impl Default for RawSensorFrame {
    fn default() -> Self {
        Self {
            ir: [0, 0],
            echo: None,
            accel_g: Vector3::zeros(),
            gyro_z_dps: 0.0,
            mag_xy: [1.0, 0.0],
            odometry_cm: 0.0,
        }
    }
}

/// Estimation and command execution for one vehicle
#[derive(Debug)]
pub struct ControlLoop {
    conditioner: SensorConditioner,
    heading: HeadingEstimator,
    executor: CommandExecutor,
    sample: SensorSample,
    last_tick_ms: Option<u64>,
}

impl ControlLoop {
    pub fn new(config: EstimatorConfig, mag_cal: MagCalibration) -> Self {
        let heading = HeadingEstimator::new(&config, mag_cal);
        let executor = CommandExecutor::new(&config);
        Self {
            conditioner: SensorConditioner::new(config),
            heading,
            executor,
            sample: SensorSample::new(),
            last_tick_ms: None,
        }
    }

    /// Average stationary IMU readings into the gyro/accel bias.
    pub fn calibrate<F>(&mut self, sample_count: u16, read: F) -> ImuBias
    where
        F: FnMut() -> (f32, Vector3<f32>),
    {
        self.heading.calibrate(sample_count, read)
    }

    /// Take the current magnetic heading as the zero reference.
    pub fn init_heading(&mut self, raw_mag_xy: [f32; 2]) -> f32 {
        let reference = self.heading.init_from_magnetometer(raw_mag_xy);
        self.sample.heading = self.heading.heading();
        reference
    }

    pub fn sample(&self) -> &SensorSample {
        &self.sample
    }

    pub fn heading_estimator(&self) -> &HeadingEstimator {
        &self.heading
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut CommandExecutor {
        &mut self.executor
    }

    /// Conditioner, for ultrasonic trigger scheduling
    pub fn conditioner_mut(&mut self) -> &mut SensorConditioner {
        &mut self.conditioner
    }

    /// Condition `frame`, update the heading and run the executor.
    ///
    /// The first tick has a zero time step.
    pub fn tick(&mut self, now_ms: u64, frame: &RawSensorFrame, queue: &mut CommandQueue) -> TickOutput {
        let input = self.update_estimates(now_ms, frame);
        self.execute(&input, queue)
    }

    /// Condition `frame` into the sample and update the heading.
    ///
    /// Returns the executor input for this tick. Split from [`execute`] so a
    /// caller sharing the queue only needs to lock it for the executor step.
    ///
    /// [`execute`]: Self::execute
    pub fn update_estimates(&mut self, now_ms: u64, frame: &RawSensorFrame) -> TickInput {
        let dt_ms = match self.last_tick_ms {
            Some(last) => now_ms.saturating_sub(last) as f32,
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);

        let bias = *self.heading.bias();
        self.conditioner.read_ir(&mut self.sample, frame.ir);
        if let Some(echo) = frame.echo {
            // Gated on capture time, so a late tick does not drop a valid echo
            self.conditioner
                .read_ultrasonic(&mut self.sample, echo.width_s, echo.captured_ms);
        }
        self.conditioner
            .read_accel(&mut self.sample, frame.accel_g, &bias);
        self.conditioner
            .read_gyro_z(&mut self.sample, frame.gyro_z_dps, &bias);
        self.sample.heading = self.heading.update(dt_ms, frame.gyro_z_dps, frame.mag_xy);

        TickInput {
            dt_ms,
            forward_accel: self.conditioner.forward_accel(&self.sample),
            odometry_cm: frame.odometry_cm,
        }
    }

    /// Run the executor against the current sample.
    pub fn execute(&mut self, input: &TickInput, queue: &mut CommandQueue) -> TickOutput {
        self.executor.tick(queue, input, &self.sample)
    }
}
