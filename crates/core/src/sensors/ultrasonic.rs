//! Ultrasonic ranging
//!
//! The sensor is fired with a short trigger pulse; the echo width is captured
//! asynchronously and handed in as seconds. Echoes closer than the minimum
//! interval to the last accepted one are not new samples, and a missed echo
//! simply leaves the filtered distance where it was.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::EstimatorConfig;
use crate::filter::LowPassFilter;

/// One captured echo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoPulse {
    /// Echo width (s)
    pub width_s: f32,
    /// Time the echo started (ms since boot)
    pub captured_ms: u64,
}

/// Convert an echo pulse width (seconds) to a one-way distance in cm.
pub fn pulse_to_distance_cm(pulse_s: f32, speed_of_sound_cm_s: f32) -> f32 {
    pulse_s * speed_of_sound_cm_s / 2.0
}

/// Ultrasonic trigger scheduling, echo gating and smoothing
#[derive(Debug, Clone)]
pub struct UltrasonicRanger {
    filter: LowPassFilter,
    speed_of_sound_cm_s: f32,
    min_interval_ms: u64,
    trigger_us: u32,
    last_sample_ms: Option<u64>,
    last_trigger_ms: Option<u64>,
}

impl UltrasonicRanger {
    /// Create a ranger from the estimator configuration.
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            filter: LowPassFilter::new(config.ultrasonic_alpha),
            speed_of_sound_cm_s: config.speed_of_sound_cm_s,
            min_interval_ms: config.ultrasonic_min_interval_ms,
            trigger_us: crate::config::ULTRASONIC_TRIGGER_US,
            last_sample_ms: None,
            last_trigger_ms: None,
        }
    }

    /// Offer an echo pulse captured at `now_ms`.
    ///
    /// Returns the new filtered distance, or `None` if the echo arrived within
    /// the minimum interval of the previous accepted one.
    pub fn accept(&mut self, pulse_s: f32, now_ms: u64) -> Option<f32> {
        if let Some(last) = self.last_sample_ms {
            if now_ms.saturating_sub(last) < self.min_interval_ms {
                return None;
            }
        }

        self.last_sample_ms = Some(now_ms);
        let raw = pulse_to_distance_cm(pulse_s, self.speed_of_sound_cm_s);
        Some(self.filter.apply(raw))
    }

    /// Filtered distance in cm, `None` before the first accepted echo.
    pub fn distance(&self) -> Option<f32> {
        self.filter.value()
    }

    /// Whether enough time has passed since the last trigger to fire again.
    pub fn trigger_due(&self, now_ms: u64) -> bool {
        match self.last_trigger_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.min_interval_ms,
        }
    }

    /// Fire the trigger pulse: LOW, HIGH for the trigger width, LOW.
    ///
    /// Busy-waits on `delay` for the pulse width (about 10 µs).
    pub fn trigger<P, D>(&mut self, pin: &mut P, delay: &mut D, now_ms: u64) -> Result<(), P::Error>
    where
        P: OutputPin,
        D: DelayNs,
    {
        pin.set_low()?;
        pin.set_high()?;
        delay.delay_us(self.trigger_us);
        pin.set_low()?;
        self.last_trigger_ms = Some(now_ms);
        Ok(())
    }
}
