//! Heading estimator
//!
//! Integrates the bias-corrected yaw rate and pulls the integrated angle a
//! fraction of the way toward the magnetic heading on every update. The
//! correction works on the shortest signed difference, so crossing the
//! ±180° seam never produces a 360° jump. The heading reported is relative
//! to the magnetic heading recorded at start-up.
//!
//! Magnetic angle: low-pass X/Y, apply hard/soft iron calibration, then
//! `-atan2(y, x)` in degrees.

use libm::atan2f;
use nalgebra::{Vector2, Vector3};

use super::angle::{angle_diff_180, wrap_180};
use crate::config::EstimatorConfig;
use crate::filter::LowPassFilter;
use crate::sensors::calibration::{ImuBias, MagCalibration};
use crate::sensors::conditioner::scale_gyro_z;

/// Heading and calibration state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingState {
    /// Fused heading relative to the start-up reference, [-180, 180)
    pub heading_deg: f32,
    /// Magnetic heading at start-up (deg)
    pub heading_bias: f32,
    /// Yaw-rate bias (deg/s)
    pub gyro_bias: f32,
    /// Accelerometer bias (g)
    pub accel_bias: Vector3<f32>,
}

/// Gyro + magnetometer heading fusion
#[derive(Debug, Clone)]
pub struct HeadingEstimator {
    heading_deg: f32,
    heading_bias: f32,
    integrated: f32,
    bias: ImuBias,
    mag: [LowPassFilter; 2],
    mag_cal: MagCalibration,
    correction_gain: f32,
}

impl HeadingEstimator {
    /// Create an uncalibrated estimator with reference heading 0.
    pub fn new(config: &EstimatorConfig, mag_cal: MagCalibration) -> Self {
        let mag = LowPassFilter::new(config.mag_alpha);
        Self {
            heading_deg: 0.0,
            heading_bias: 0.0,
            integrated: 0.0,
            bias: ImuBias::new(),
            mag: [mag; 2],
            mag_cal,
            correction_gain: config.mag_correction_gain.clamp(0.0, 1.0),
        }
    }

    /// Average `sample_count` stationary readings into the gyro/accel bias.
    ///
    /// `read` returns one raw `(gyro_z deg/s, accel g)` pair per call. The
    /// vehicle must not move while this runs.
    pub fn calibrate<F>(&mut self, sample_count: u16, read: F) -> ImuBias
    where
        F: FnMut() -> (f32, Vector3<f32>),
    {
        self.bias = ImuBias::from_source(sample_count, read);
        self.bias
    }

    /// Install a bias obtained elsewhere.
    pub fn set_bias(&mut self, bias: ImuBias) {
        self.bias = bias;
    }

    /// Current gyro/accel bias
    pub fn bias(&self) -> &ImuBias {
        &self.bias
    }

    /// Record the start-up magnetic heading and seed the integration.
    pub fn init_reference(&mut self, initial_magnetic_heading_deg: f32) {
        self.heading_bias = initial_magnetic_heading_deg;
        self.integrated = wrap_180(initial_magnetic_heading_deg);
        self.heading_deg = 0.0;
    }

    /// Preload the magnetometer filters from `raw_xy` and use the resulting
    /// magnetic angle as the reference. Returns that angle.
    pub fn init_from_magnetometer(&mut self, raw_xy: [f32; 2]) -> f32 {
        for (filter, raw) in self.mag.iter_mut().zip(raw_xy) {
            *filter = LowPassFilter::seeded(filter.alpha(), raw);
        }
        let angle = self.calibrated_angle(self.filtered_mag());
        self.init_reference(angle);
        angle
    }

    /// Filter a raw magnetometer X/Y pair and return the magnetic angle (deg).
    pub fn magnetic_angle(&mut self, raw_xy: [f32; 2]) -> f32 {
        for (filter, raw) in self.mag.iter_mut().zip(raw_xy) {
            filter.apply(raw);
        }
        self.calibrated_angle(self.filtered_mag())
    }

    fn filtered_mag(&self) -> Vector2<f32> {
        Vector2::new(
            self.mag[0].value().unwrap_or(0.0),
            self.mag[1].value().unwrap_or(0.0),
        )
    }

    fn calibrated_angle(&self, mag: Vector2<f32>) -> f32 {
        let mag = self.mag_cal.apply(mag);
        -atan2f(mag.y, mag.x).to_degrees()
    }

    /// Advance the heading by one tick.
    ///
    /// # Arguments
    ///
    /// * `dt_ms` - Tick length (ms)
    /// * `raw_gyro_z` - Raw yaw rate (deg/s), bias not removed
    /// * `raw_mag_xy` - Raw magnetometer X/Y
    ///
    /// # Returns
    ///
    /// Heading relative to the start-up reference, in [-180, 180)
    pub fn update(&mut self, dt_ms: f32, raw_gyro_z: f32, raw_mag_xy: [f32; 2]) -> f32 {
        let rate = scale_gyro_z(raw_gyro_z, &self.bias);
        self.integrated = wrap_180(self.integrated + rate * dt_ms);

        let magnetic = self.magnetic_angle(raw_mag_xy);
        let correction = angle_diff_180(magnetic, self.integrated);
        self.integrated = wrap_180(self.integrated + self.correction_gain * correction);

        self.heading_deg = angle_diff_180(self.integrated, self.heading_bias);
        self.heading_deg
    }

    /// Last fused heading (deg)
    pub fn heading(&self) -> f32 {
        self.heading_deg
    }

    /// Heading plus calibration snapshot
    pub fn state(&self) -> HeadingState {
        HeadingState {
            heading_deg: self.heading_deg,
            heading_bias: self.heading_bias,
            gyro_bias: self.bias.gyro_z,
            accel_bias: self.bias.accel,
        }
    }
}
