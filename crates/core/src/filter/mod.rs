//! Scalar signal filters
//!
//! - [`ScalarKalman`]: one-dimensional recursive estimator
//! - [`LowPassFilter`]: exponential smoothing with a per-channel coefficient

pub mod kalman;
pub mod lowpass;

pub use kalman::ScalarKalman;
pub use lowpass::LowPassFilter;
