//! Scalar Kalman filter
//!
//! Fuses a propagated estimate with an independent measurement, weighting
//! each by its variance.
//!
//! # Preconditions
//!
//! Both variances must be non-negative and the measurement variance must be
//! positive. Violations are caller bugs; no runtime validation is performed.

/// One-dimensional Kalman filter state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarKalman {
    last_estimate: f32,
    estimate_variance: f32,
    measurement_variance: f32,
}

impl ScalarKalman {
    /// Create a filter seeded with an initial estimate and both variances.
    pub const fn new(
        initial_estimate: f32,
        process_noise_variance: f32,
        measurement_noise_variance: f32,
    ) -> Self {
        Self {
            last_estimate: initial_estimate,
            estimate_variance: process_noise_variance,
            measurement_variance: measurement_noise_variance,
        }
    }

    /// Re-initialize in place (start of a new estimation context).
    pub fn init(
        &mut self,
        initial_estimate: f32,
        process_noise_variance: f32,
        measurement_noise_variance: f32,
    ) {
        *self = Self::new(
            initial_estimate,
            process_noise_variance,
            measurement_noise_variance,
        );
    }

    /// Kalman gain for the current variances, in [0, 1].
    pub fn gain(&self) -> f32 {
        self.estimate_variance / (self.estimate_variance + self.measurement_variance)
    }

    /// Fuse `predicted` with `measurement` and return the fused estimate.
    ///
    /// # Formula
    ///
    /// ```text
    /// k     = P / (P + R)
    /// fused = predicted + k * (measurement - predicted)
    /// P     = (1 - k) * P
    /// ```
    pub fn update(&mut self, predicted: f32, measurement: f32) -> f32 {
        let k = self.gain();
        let fused = predicted + k * (measurement - predicted);
        self.last_estimate = fused;
        self.estimate_variance *= 1.0 - k;
        fused
    }

    /// Grow the estimate variance by `extra` (uncertainty added by propagation).
    pub fn inflate(&mut self, extra: f32) {
        self.estimate_variance += extra;
    }

    /// Most recent fused estimate.
    pub fn last_estimate(&self) -> f32 {
        self.last_estimate
    }

    /// Current estimate variance (P).
    pub fn estimate_variance(&self) -> f32 {
        self.estimate_variance
    }

    /// Measurement variance (R).
    pub fn measurement_variance(&self) -> f32 {
        self.measurement_variance
    }
}
