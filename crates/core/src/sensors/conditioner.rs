//! Raw sample conditioning
//!
//! Converts raw sensor values to physical units and smooths them into the
//! shared [`SensorSample`]:
//!
//! | Channel       | Conversion                              | Alpha |
//! |---------------|-----------------------------------------|-------|
//! | IR (L/R)      | inverse power-law curve, clamped        | 0.95  |
//! | Ultrasonic    | echo width × speed of sound / 2         | 0.1   |
//! | Accelerometer | (raw − bias − 1 g on Z) × gravity       | 0.8   |
//! | Gyroscope Z   | (raw − bias) / 1000 (per millisecond)   | none  |

use libm::powf;
use nalgebra::Vector3;

use super::calibration::ImuBias;
use super::sample::SensorSample;
use super::ultrasonic::UltrasonicRanger;
use crate::config::EstimatorConfig;
use crate::filter::LowPassFilter;

/// Convert a raw IR ADC reading to a distance in cm.
///
/// ```text
/// div  = (raw / full_scale) ^ exponent
/// dist = div < coeff / max ? max : coeff / div
/// dist = max(dist - offset, min)
/// ```
///
/// A weak (near-zero) signal maps to the far end of the range; a saturated
/// one clamps to the near limit.
pub fn ir_value_to_distance(raw: u16, config: &EstimatorConfig) -> f32 {
    let div = powf(raw as f32 / config.ir_full_scale, config.ir_curve_exponent);
    let dist = if div < config.ir_curve_coeff / config.ir_max_cm {
        config.ir_max_cm
    } else {
        config.ir_curve_coeff / div
    };

    (dist - config.ir_offset_cm).max(config.ir_min_cm)
}

/// Remove yaw-rate bias and convert deg/s to deg/ms.
pub fn scale_gyro_z(raw_dps: f32, bias: &ImuBias) -> f32 {
    bias.apply_gyro_z(raw_dps) / 1000.0
}

/// Per-channel filters and conversion constants
#[derive(Debug, Clone)]
pub struct SensorConditioner {
    config: EstimatorConfig,
    ir: [LowPassFilter; 2],
    accel: [LowPassFilter; 3],
    ultrasonic: UltrasonicRanger,
}

impl SensorConditioner {
    /// Create a conditioner with unseeded filters.
    pub fn new(config: EstimatorConfig) -> Self {
        let ir = LowPassFilter::new(config.ir_alpha);
        let accel = LowPassFilter::new(config.accel_alpha);
        let ultrasonic = UltrasonicRanger::new(&config);
        Self {
            ir: [ir; 2],
            accel: [accel; 3],
            ultrasonic,
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Ultrasonic ranger (trigger scheduling and echo gating)
    pub fn ultrasonic(&mut self) -> &mut UltrasonicRanger {
        &mut self.ultrasonic
    }

    /// Convert and smooth both IR channels, `raw = [left, right]`.
    pub fn read_ir(&mut self, sample: &mut SensorSample, raw: [u16; 2]) {
        for (i, value) in raw.iter().enumerate() {
            let dist = ir_value_to_distance(*value, &self.config);
            sample.ir_dist[i] = self.ir[i].apply(dist);
        }
    }

    /// Offer an ultrasonic echo captured at `now_ms`.
    ///
    /// Returns `false` and leaves the sample untouched when the echo is not a
    /// valid new sample.
    pub fn read_ultrasonic(&mut self, sample: &mut SensorSample, pulse_s: f32, now_ms: u64) -> bool {
        match self.ultrasonic.accept(pulse_s, now_ms) {
            Some(dist) => {
                sample.ultrasound_dist = dist;
                true
            }
            None => false,
        }
    }

    /// Remove bias, scale to cm/ms² and smooth a raw accelerometer reading (g).
    pub fn read_accel(&mut self, sample: &mut SensorSample, raw: Vector3<f32>, bias: &ImuBias) {
        let scaled = bias.apply_accel(raw) * self.config.gravity;
        for i in 0..3 {
            sample.accel[i] = self.accel[i].apply(scaled[i]);
        }
    }

    /// Remove bias and store the yaw rate in deg/ms.
    pub fn read_gyro_z(&self, sample: &mut SensorSample, raw_dps: f32, bias: &ImuBias) {
        sample.gyro_z = scale_gyro_z(raw_dps, bias);
    }

    /// Acceleration along the direction of travel (cm/ms²)
    pub fn forward_accel(&self, sample: &SensorSample) -> f32 {
        sample.accel[self.config.forward_axis]
    }
}
