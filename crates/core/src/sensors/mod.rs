//! Sensor snapshot, calibration and raw-sample conditioning
//!
//! Raw ADC counts, echo pulse widths and IMU readings enter here and leave
//! as smoothed physical values in a shared [`SensorSample`].

pub mod calibration;
pub mod conditioner;
pub mod sample;
pub mod ultrasonic;

pub use calibration::{ImuBias, MagCalibration, NOMINAL_GRAVITY_G};
pub use conditioner::{ir_value_to_distance, scale_gyro_z, SensorConditioner};
pub use sample::{IrChannel, SensorSample};
pub use ultrasonic::{pulse_to_distance_cm, EchoPulse, UltrasonicRanger};
