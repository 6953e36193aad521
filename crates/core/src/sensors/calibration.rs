//! IMU bias and magnetometer calibration
//!
//! Gyro and accelerometer biases come from a one-time average taken while
//! the vehicle is stationary. Magnetometer hard/soft iron values come from an
//! offline fit and are applied to the X/Y pair only.

use nalgebra::{Vector2, Vector3};

/// Accelerometer reading of gravity at rest, in raw units (g)
pub const NOMINAL_GRAVITY_G: f32 = 1.0;

/// Gyro and accelerometer bias
///
/// Raw units: gyro in degrees per second, accelerometer in g.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuBias {
    /// Yaw-rate bias (deg/s)
    pub gyro_z: f32,

    /// Accelerometer bias (g)
    ///
    /// The Z component is measured relative to one gravity. Bias removal
    /// also removes that gravity, so a level vehicle at rest reads zero on
    /// every axis.
    pub accel: Vector3<f32>,
}

impl Default for ImuBias {
    fn default() -> Self {
        Self::new()
    }
}

impl ImuBias {
    /// Zero bias (uncalibrated)
    pub const fn new() -> Self {
        Self {
            gyro_z: 0.0,
            accel: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Estimate bias from stationary gyro and accelerometer samples.
    ///
    /// Returns zero bias for an axis group with no samples.
    pub fn estimate(gyro_z: &[f32], accel: &[Vector3<f32>]) -> Self {
        let mut bias = Self::new();

        if !gyro_z.is_empty() {
            bias.gyro_z = gyro_z.iter().sum::<f32>() / gyro_z.len() as f32;
        }

        if !accel.is_empty() {
            let sum = accel
                .iter()
                .fold(Vector3::zeros(), |acc, sample| acc + sample);
            bias.accel = sum / accel.len() as f32;
            bias.accel.z -= NOMINAL_GRAVITY_G;
        }

        bias
    }

    /// Estimate bias by reading `count` samples from `read`.
    ///
    /// `read` returns one `(gyro_z, accel)` pair per call. Runs with constant
    /// memory so the firmware can average long runs.
    pub fn from_source<F>(count: u16, mut read: F) -> Self
    where
        F: FnMut() -> (f32, Vector3<f32>),
    {
        if count == 0 {
            return Self::new();
        }

        let mut gyro_total = 0.0f32;
        let mut accel_total = Vector3::zeros();
        for _ in 0..count {
            let (gyro_z, accel) = read();
            gyro_total += gyro_z;
            accel_total += accel;
        }

        let n = count as f32;
        let mut accel = accel_total / n;
        accel.z -= NOMINAL_GRAVITY_G;

        Self {
            gyro_z: gyro_total / n,
            accel,
        }
    }

    /// Remove yaw-rate bias (deg/s)
    pub fn apply_gyro_z(&self, raw: f32) -> f32 {
        raw - self.gyro_z
    }

    /// Remove accelerometer bias and nominal gravity (g)
    pub fn apply_accel(&self, raw: Vector3<f32>) -> Vector3<f32> {
        raw - self.accel - Vector3::new(0.0, 0.0, NOMINAL_GRAVITY_G)
    }

    /// Heuristic check that calibration has run (any non-zero bias)
    pub fn is_calibrated(&self) -> bool {
        self.gyro_z != 0.0 || self.accel.norm() > 0.0
    }
}

/// Magnetometer hard/soft iron calibration for the horizontal axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagCalibration {
    /// Hard iron offset, subtracted from raw X/Y
    pub offset: Vector2<f32>,
    /// Soft iron scale (diagonal), applied after offset removal
    pub scale: Vector2<f32>,
}

impl Default for MagCalibration {
    /// Identity calibration
    fn default() -> Self {
        Self {
            offset: Vector2::zeros(),
            scale: Vector2::new(1.0, 1.0),
        }
    }
}

impl MagCalibration {
    /// Apply calibration to a raw X/Y pair
    ///
    /// ```text
    /// calibrated = (raw - offset) .* scale
    /// ```
    pub fn apply(&self, raw: Vector2<f32>) -> Vector2<f32> {
        (raw - self.offset).component_mul(&self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_estimate_means_and_gravity() {
        let gyro = [0.5, 0.7, 0.6, 0.6];
        let accel = [
            Vector3::new(0.01, -0.02, 1.01),
            Vector3::new(0.03, -0.02, 0.99),
            Vector3::new(0.02, -0.02, 1.00),
        ];

        let bias = ImuBias::estimate(&gyro, &accel);

        assert!((bias.gyro_z - 0.6).abs() < EPSILON);
        assert!((bias.accel.x - 0.02).abs() < EPSILON);
        assert!((bias.accel.y - (-0.02)).abs() < EPSILON);
        // mean Z is 1.00 g, gravity removed from the bias
        assert!(bias.accel.z.abs() < EPSILON);
    }

    #[test]
    fn test_resting_sample_reads_zero() {
        let rest = Vector3::new(0.05, -0.03, 1.02);
        let bias = ImuBias::estimate(&[0.0], &[rest]);
        let corrected = bias.apply_accel(rest);

        assert!(corrected.x.abs() < EPSILON);
        assert!(corrected.y.abs() < EPSILON);
        assert!(corrected.z.abs() < EPSILON);
    }

    #[test]
    fn test_streamed_bias_rests_at_zero_on_z() {
        let rest = Vector3::new(0.05, -0.03, 1.02);
        let bias = ImuBias::from_source(10, || (0.0, rest));

        assert!((bias.accel.z - 0.02).abs() < EPSILON);
        assert!(bias.apply_accel(rest).norm() < EPSILON);
        // Lifting off the floor reads minus one gravity
        assert!((bias.apply_accel(Vector3::new(0.05, -0.03, 0.02)).z + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_uncalibrated_level_rest_reads_zero() {
        let corrected = ImuBias::new().apply_accel(Vector3::new(0.0, 0.0, NOMINAL_GRAVITY_G));
        assert!(corrected.norm() < EPSILON);
    }

    #[test]
    fn test_estimate_empty_is_zero() {
        let bias = ImuBias::estimate(&[], &[]);
        assert_eq!(bias, ImuBias::new());
        assert!(!bias.is_calibrated());
    }

    #[test]
    fn test_from_source_matches_estimate() {
        let gyro = [1.0, 2.0, 3.0, 4.0];
        let accel = [
            Vector3::new(0.1, 0.0, 1.0),
            Vector3::new(0.2, 0.0, 1.0),
            Vector3::new(0.3, 0.0, 1.0),
            Vector3::new(0.4, 0.0, 1.0),
        ];

        let mut i = 0;
        let streamed = ImuBias::from_source(4, || {
            let pair = (gyro[i], accel[i]);
            i += 1;
            pair
        });
        let batched = ImuBias::estimate(&gyro, &accel);

        assert!((streamed.gyro_z - batched.gyro_z).abs() < EPSILON);
        assert!((streamed.accel - batched.accel).norm() < EPSILON);
        assert!(streamed.is_calibrated());
    }

    #[test]
    fn test_from_source_zero_count() {
        let bias = ImuBias::from_source(0, || panic!("must not read"));
        assert_eq!(bias, ImuBias::new());
    }

    #[test]
    fn test_apply_gyro_z() {
        let bias = ImuBias {
            gyro_z: 0.8,
            ..Default::default()
        };
        assert!((bias.apply_gyro_z(10.8) - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_mag_calibration() {
        let cal = MagCalibration {
            offset: Vector2::new(5.0, -3.0),
            scale: Vector2::new(1.1, 0.9),
        };
        let calibrated = cal.apply(Vector2::new(25.0, 17.0));
        // (25 - 5) * 1.1, (17 + 3) * 0.9
        assert!((calibrated.x - 22.0).abs() < EPSILON);
        assert!((calibrated.y - 18.0).abs() < EPSILON);
    }

    #[test]
    fn test_mag_calibration_identity() {
        let raw = Vector2::new(-12.5, 40.0);
        assert_eq!(MagCalibration::default().apply(raw), raw);
    }
}
