//! Ultrasonic range sensor
//!
//! The echo pin's edge interrupt timestamps the rising and falling edges;
//! the resulting pulse, stamped with its rising-edge time, sits in a
//! single-slot mailbox until the control task takes it. The trigger is fired from the control task, never faster
//! than the ranger's minimum interval.

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use mdp_car_core::sensors::{EchoPulse, UltrasonicRanger};

use crate::platform::{GpioError, Result};

#[derive(Clone, Copy)]
struct EchoState {
    rise_us: Option<u64>,
    pulse: Option<EchoPulse>,
}

/// Interrupt-to-task handoff for echo pulses
///
/// A newer pulse overwrites one the task has not taken yet.
pub struct EchoCapture {
    state: Mutex<Cell<EchoState>>,
}

impl Default for EchoCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoCapture {
    /// Const fn for static initialization.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(EchoState {
                rise_us: None,
                pulse: None,
            })),
        }
    }

    /// Record an echo edge. Called from the edge interrupt.
    pub fn on_edge(&self, rising: bool, now_us: u64) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            if rising {
                state.rise_us = Some(now_us);
            } else if let Some(rise) = state.rise_us.take() {
                state.pulse = Some(EchoPulse {
                    width_s: now_us.saturating_sub(rise) as f32 / 1_000_000.0,
                    captured_ms: rise / 1_000,
                });
            }
            cell.set(state);
        });
    }

    /// Take the latest complete pulse, if any.
    pub fn take_pulse(&self) -> Option<EchoPulse> {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let pulse = state.pulse.take();
            cell.set(state);
            pulse
        })
    }
}

/// Trigger pin, pulse delay and echo mailbox of one sensor
pub struct UltrasonicSensor<'a, P: OutputPin, D: DelayNs> {
    trigger: P,
    delay: D,
    echo: &'a EchoCapture,
}

impl<'a, P: OutputPin, D: DelayNs> UltrasonicSensor<'a, P, D> {
    pub fn new(trigger: P, delay: D, echo: &'a EchoCapture) -> Self {
        Self {
            trigger,
            delay,
            echo,
        }
    }

    /// Fire the trigger pulse if the ranger's spacing allows it.
    ///
    /// Returns whether a pulse was sent.
    pub fn fire_if_due(&mut self, ranger: &mut UltrasonicRanger, now_ms: u64) -> Result<bool> {
        if !ranger.trigger_due(now_ms) {
            return Ok(false);
        }
        ranger
            .trigger(&mut self.trigger, &mut self.delay, now_ms)
            .map_err(|_| GpioError::HardwareError)?;
        Ok(true)
    }

    pub fn take_pulse(&self) -> Option<EchoPulse> {
        self.echo.take_pulse()
    }
}
