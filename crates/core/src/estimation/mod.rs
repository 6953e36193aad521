//! Distance and heading estimation
//!
//! - [`DistanceEstimator`]: accelerometer dead reckoning fused with wheel odometry
//! - [`HeadingEstimator`]: gyro integration corrected toward the magnetic heading
//! - [`angle`]: shortest-signed-angle arithmetic shared by both and the executor

pub mod angle;
pub mod distance;
pub mod heading;

pub use angle::{angle_diff_180, wrap_180};
pub use distance::{DistanceEstimator, DistanceState};
pub use heading::{HeadingEstimator, HeadingState};
