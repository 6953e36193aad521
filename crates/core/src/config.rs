//! Estimator and sensor-curve configuration
//!
//! Units follow the control loop: distances in centimetres, time in
//! milliseconds, angles in degrees.

/// Process noise of accelerometer dead reckoning (σ_accel²)
pub const PROCESS_NOISE_ACCEL: f32 = 9.80665e-6;
/// Measurement noise of wheel odometry (σ_motor²)
pub const MOTOR_MEASUREMENT_NOISE: f32 = 0.75;

/// Smoothing coefficient for IR distance (higher = heavier smoothing)
pub const IR_ALPHA: f32 = 0.95;
/// Smoothing coefficient for ultrasonic distance
pub const ULTRASONIC_ALPHA: f32 = 0.1;
/// Smoothing coefficient for accelerometer axes
pub const ACCEL_ALPHA: f32 = 0.8;
/// Smoothing coefficient for magnetometer X/Y
pub const MAG_ALPHA: f32 = 0.9;

/// Nearest reliable IR distance (cm)
pub const IR_MIN_CM: f32 = 6.0;
/// Farthest reliable IR distance (cm)
pub const IR_MAX_CM: f32 = 70.0;
/// Distance from the IR sensor to the front of the vehicle (cm)
pub const IR_OFFSET_CM: f32 = 4.5;
/// Numerator of the IR inverse power-law curve
pub const IR_CURVE_COEFF: f32 = 6.3028;
/// Exponent of the IR inverse power-law curve
pub const IR_CURVE_EXPONENT: f32 = 1.226;
/// Full-scale reading of the 12-bit IR ADC
pub const IR_FULL_SCALE: f32 = 4095.0;

/// Minimum spacing between accepted ultrasonic samples (ms)
pub const ULTRASONIC_MIN_INTERVAL_MS: u64 = 20;
/// Width of the ultrasonic trigger pulse (µs)
pub const ULTRASONIC_TRIGGER_US: u32 = 10;
/// Speed of sound (cm/s)
pub const SPEED_OF_SOUND_CM_S: f32 = 34300.0;

/// Earth gravity in cm/ms²
pub const GRAVITY_CM_MS2: f32 = 9.80665e-4;

/// Fraction of the gyro/magnetometer disagreement removed per heading update
pub const MAG_CORRECTION_GAIN: f32 = 0.02;

/// Estimator and conditioning configuration
///
/// `Default` yields the calibrated constants above. Individual fields may be
/// overridden for a different sensor fit.
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Process noise variance of dead reckoning (σ_accel²)
    pub process_noise_accel: f32,
    /// Measurement noise variance of wheel odometry (σ_motor²)
    pub motor_measurement_noise: f32,
    /// IR smoothing coefficient
    pub ir_alpha: f32,
    /// Ultrasonic smoothing coefficient
    pub ultrasonic_alpha: f32,
    /// Accelerometer smoothing coefficient
    pub accel_alpha: f32,
    /// Magnetometer smoothing coefficient
    pub mag_alpha: f32,
    /// IR lower clamp (cm)
    pub ir_min_cm: f32,
    /// IR upper clamp (cm)
    pub ir_max_cm: f32,
    /// IR mechanical offset (cm)
    pub ir_offset_cm: f32,
    /// IR curve numerator
    pub ir_curve_coeff: f32,
    /// IR curve exponent
    pub ir_curve_exponent: f32,
    /// IR ADC full scale
    pub ir_full_scale: f32,
    /// Minimum spacing between accepted ultrasonic samples (ms)
    pub ultrasonic_min_interval_ms: u64,
    /// Speed of sound (cm/s)
    pub speed_of_sound_cm_s: f32,
    /// Gravity used to scale accelerometer readings (cm/ms² per g)
    pub gravity: f32,
    /// Magnetic correction gain in [0, 1] (0 = gyro only, 1 = magnetometer only)
    pub mag_correction_gain: f32,
    /// Accelerometer axis pointing along the direction of travel (0 = X)
    pub forward_axis: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            process_noise_accel: PROCESS_NOISE_ACCEL,
            motor_measurement_noise: MOTOR_MEASUREMENT_NOISE,
            ir_alpha: IR_ALPHA,
            ultrasonic_alpha: ULTRASONIC_ALPHA,
            accel_alpha: ACCEL_ALPHA,
            mag_alpha: MAG_ALPHA,
            ir_min_cm: IR_MIN_CM,
            ir_max_cm: IR_MAX_CM,
            ir_offset_cm: IR_OFFSET_CM,
            ir_curve_coeff: IR_CURVE_COEFF,
            ir_curve_exponent: IR_CURVE_EXPONENT,
            ir_full_scale: IR_FULL_SCALE,
            ultrasonic_min_interval_ms: ULTRASONIC_MIN_INTERVAL_MS,
            speed_of_sound_cm_s: SPEED_OF_SOUND_CM_S,
            gravity: GRAVITY_CM_MS2,
            mag_correction_gain: MAG_CORRECTION_GAIN,
            forward_axis: 0,
        }
    }
}
