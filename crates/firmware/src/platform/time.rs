//! Embassy-backed clock for the control task and ultrasonic gating.

use mdp_car_core::traits::TimeSource;

/// Reads the Embassy time driver's monotonic instant.
///
/// ```ignore
/// use mdp_car_firmware::platform::EmbassyTime;
/// use mdp_car_core::control::ControlLoop;
///
/// let frame_time_ms = EmbassyTime.now_ms();
/// control.tick(frame_time_ms, &frame, &mut queue);
/// ```
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}
