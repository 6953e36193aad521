//! Monotonic time abstraction for the control loop and sensor gating.
//!
//! The control loop derives its tick length from a `TimeSource`, and the
//! ultrasonic ranger uses it to enforce the minimum spacing between echo
//! samples. Firmware provides an Embassy-backed source; tests use `MockTime`.

use core::cell::Cell;

/// Monotonic time source in micro- and milliseconds since boot.
///
/// # Example
///
/// ```
/// use mdp_car_core::traits::{MockTime, TimeSource};
///
/// fn tick_length_ms<T: TimeSource>(time: &T, last_tick_us: &mut u64) -> f32 {
///     let elapsed = time.elapsed_since(*last_tick_us);
///     *last_tick_us = time.now_us();
///     elapsed as f32 / 1000.0
/// }
///
/// let time = MockTime::new();
/// let mut last = 0;
/// time.advance_ms(20);
/// assert_eq!(tick_length_ms(&time, &mut last), 20.0);
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Microseconds elapsed since `reference_us`, saturating at zero.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }

    /// Milliseconds elapsed since `reference_ms`, saturating at zero.
    fn elapsed_ms_since(&self, reference_ms: u64) -> u64 {
        self.now_ms().saturating_sub(reference_ms)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Hand-cranked clock for deterministic tests.
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is only used in single-threaded test contexts.
// The Send+Sync bounds on TimeSource exist for the embedded executor.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Sets the current time to an absolute value in microseconds.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the clock by `us` microseconds.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Advances the clock by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * 1000);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
