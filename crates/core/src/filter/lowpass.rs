//! Exponential low-pass filter
//!
//! `filtered = alpha * old + (1 - alpha) * new`
//!
//! Higher alpha weights the previous value more heavily (heavier smoothing).
//! The first sample seeds the filter and passes through unchanged.

/// Exponential smoothing filter for one scalar channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter {
    alpha: f32,
    value: Option<f32>,
}

impl LowPassFilter {
    /// Create an unseeded filter. Alpha is clamped to [0.0, 1.0].
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: None,
        }
    }

    /// Create a filter already holding `initial`.
    pub fn seeded(alpha: f32, initial: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: Some(initial),
        }
    }

    /// Feed a new sample and return the filtered value.
    pub fn apply(&mut self, sample: f32) -> f32 {
        let filtered = match self.value {
            None => sample,
            Some(old) => self.alpha * old + (1.0 - self.alpha) * sample,
        };
        self.value = Some(filtered);
        filtered
    }

    /// Last filtered value, `None` before the first sample.
    pub fn value(&self) -> Option<f32> {
        self.value
    }

    /// Smoothing coefficient.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Forget the filtered value; the next sample seeds the filter again.
    pub fn reset(&mut self) {
        self.value = None;
    }
}
