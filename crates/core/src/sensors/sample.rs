//! Shared sensor snapshot
//!
//! Each field is overwritten independently by the conditioner or the heading
//! estimator; there is no whole-struct atomicity beyond what the owner
//! provides when sharing it.

use nalgebra::Vector3;

/// IR range sensor position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrChannel {
    /// Left-facing IR sensor
    Left = 0,
    /// Right-facing IR sensor
    Right = 1,
}

impl IrChannel {
    /// Index into [`SensorSample::ir_dist`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Channel name for logging
    pub const fn as_str(self) -> &'static str {
        match self {
            IrChannel::Left => "left",
            IrChannel::Right => "right",
        }
    }
}

/// Latest conditioned readings consumed by the control loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// Smoothed IR distance in cm, `[left, right]`
    pub ir_dist: [f32; 2],
    /// Smoothed forward ultrasonic distance in cm
    pub ultrasound_dist: f32,
    /// Bias-corrected yaw rate in degrees per millisecond
    pub gyro_z: f32,
    /// Bias-corrected, smoothed acceleration in cm/ms²
    pub accel: Vector3<f32>,
    /// Fused heading in degrees, [-180, 180)
    pub heading: f32,
}

impl Default for SensorSample {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSample {
    /// Zeroed snapshot (const fn for static initialization)
    pub const fn new() -> Self {
        Self {
            ir_dist: [0.0, 0.0],
            ultrasound_dist: 0.0,
            gyro_z: 0.0,
            accel: Vector3::new(0.0, 0.0, 0.0),
            heading: 0.0,
        }
    }

    /// IR distance for one channel
    pub fn ir(&self, channel: IrChannel) -> f32 {
        self.ir_dist[channel.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let sample = SensorSample::default();
        assert_eq!(sample.ir_dist, [0.0, 0.0]);
        assert_eq!(sample.ultrasound_dist, 0.0);
        assert_eq!(sample.accel, Vector3::zeros());
        assert_eq!(sample.heading, 0.0);
    }

    #[test]
    fn test_ir_channel_lookup() {
        let sample = SensorSample {
            ir_dist: [12.0, 34.0],
            ..SensorSample::new()
        };
        assert_eq!(sample.ir(IrChannel::Left), 12.0);
        assert_eq!(sample.ir(IrChannel::Right), 34.0);
        assert_eq!(IrChannel::Right.as_str(), "right");
    }
}
