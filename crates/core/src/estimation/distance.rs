//! Dead-reckoning distance tracker
//!
//! Integrates forward acceleration into velocity and distance, growing the
//! uncertainty with every step, then fuses the propagated distance with the
//! wheel-odometry distance through one [`ScalarKalman`].
//!
//! Units: cm, ms, cm/ms, cm/ms².

use crate::config::EstimatorConfig;
use crate::filter::ScalarKalman;

/// Dead-reckoning state of the current drive segment
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceState {
    /// Fused distance travelled (cm)
    pub distance: f32,
    /// Integrated velocity (cm/ms)
    pub velocity: f32,
    /// Velocity variance
    pub velocity_variance: f32,
}

/// Distance estimator for one drive segment at a time
///
/// Call [`get_distance_cm`](Self::get_distance_cm) exactly once per control
/// tick while a segment is active, and [`reset`](Self::reset) when a new
/// segment starts.
#[derive(Debug, Clone)]
pub struct DistanceEstimator {
    state: DistanceState,
    kalman: ScalarKalman,
    process_noise: f32,
    measurement_noise: f32,
}

impl DistanceEstimator {
    /// Create an estimator at rest.
    pub fn new(config: &EstimatorConfig) -> Self {
        let mut estimator = Self {
            state: DistanceState::default(),
            kalman: ScalarKalman::new(
                0.0,
                config.process_noise_accel,
                config.motor_measurement_noise,
            ),
            process_noise: config.process_noise_accel,
            measurement_noise: config.motor_measurement_noise,
        };
        estimator.reset(0.0);
        estimator
    }

    /// Start a new segment, optionally carrying an initial velocity (cm/ms).
    pub fn reset(&mut self, initial_velocity: f32) {
        self.kalman.init(0.0, self.process_noise, self.measurement_noise);
        self.state = DistanceState {
            distance: 0.0,
            velocity: initial_velocity,
            velocity_variance: 0.0,
        };
    }

    /// Propagate the dead-reckoning state by `dt_ms` under `accel`.
    fn advance(&mut self, dt_ms: f32, accel: f32) {
        let dt2 = dt_ms * dt_ms;

        self.state.velocity += accel * dt_ms;
        self.state.distance += self.state.velocity * dt_ms;

        self.kalman.inflate(dt2 * self.state.velocity_variance);
        self.state.velocity_variance += dt2 * self.process_noise;
    }

    /// Advance by one tick and fuse with the odometry distance.
    ///
    /// # Arguments
    ///
    /// * `dt_ms` - Tick length (ms)
    /// * `accel` - Forward acceleration (cm/ms²)
    /// * `motor_distance` - Wheel-odometry distance since segment start (cm)
    ///
    /// # Returns
    ///
    /// Fused distance since segment start (cm)
    pub fn get_distance_cm(&mut self, dt_ms: f32, accel: f32, motor_distance: f32) -> f32 {
        self.advance(dt_ms, accel);
        self.state.distance = self.kalman.update(self.state.distance, motor_distance);
        self.state.distance
    }

    /// Last fused distance (cm)
    pub fn distance(&self) -> f32 {
        self.state.distance
    }

    /// Integrated velocity (cm/ms)
    pub fn velocity(&self) -> f32 {
        self.state.velocity
    }

    /// Full dead-reckoning state
    pub fn state(&self) -> DistanceState {
        self.state
    }

    /// Kalman filter backing the fusion
    pub fn kalman(&self) -> &ScalarKalman {
        &self.kalman
    }
}
