//! Time-proportioning heater driver.
//!
//! A zero-crossing solid-state relay switches the element, so power is
//! expressed as on-milliseconds per fixed window rather than PWM duty:
//! the output goes high at the start of each window and low once the
//! requested on-time has elapsed.
//!
//! ```text
//!            ┌──────┐              ┌──────┐
//!   relay ───┘      └──────────────┘      └──────
//!            │◀ on ▶│              │
//!            │◀──────  window ────▶│
//! ```
//!
//! ## State machine
//!
//! `OFF → ON` only at a window boundary (elapsed ≥ window, or the
//! millisecond clock wrapped).  `ON → OFF` once elapsed-in-window reaches
//! the requested on-time.  Both checks run every update in that order, so
//! a zero command still asserts the relay momentarily at each boundary
//! before the off check drops it within the same update.

use crate::app::ports::HeaterOutput;
use crate::config::ControllerConfig;

pub struct HeaterActuator {
    window_ms: u32,
    max_command: f32,
    window_start_ms: u32,
    on_ms: f32,
    output_on: bool,
}

impl HeaterActuator {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            window_ms: config.heater_window_ms,
            max_command: config.max_heat_command,
            window_start_ms: 0,
            on_ms: 0.0,
            output_on: false,
        }
    }

    /// Request `command` on-milliseconds per window.  Out-of-range values
    /// saturate to `[0, max]`; NaN is treated as zero.
    pub fn set_power(&mut self, command: f32) {
        self.on_ms = if command.is_nan() || command <= 0.0 {
            0.0
        } else if command >= self.max_command {
            self.max_command
        } else {
            command
        };
    }

    /// The clamped command in effect.
    pub fn power(&self) -> f32 {
        self.on_ms
    }

    pub fn is_on(&self) -> bool {
        self.output_on
    }

    /// Advance the window and drive the relay.  Call every main-loop tick.
    pub fn update(&mut self, now_ms: u32, out: &mut impl HeaterOutput) {
        // `start > now` means the counter wrapped: start a fresh window.
        if now_ms.wrapping_sub(self.window_start_ms) >= self.window_ms
            || self.window_start_ms > now_ms
        {
            self.switch(true, out);
            self.window_start_ms = now_ms;
        }
        if now_ms.wrapping_sub(self.window_start_ms) as f32 >= self.on_ms {
            self.switch(false, out);
        }
    }

    fn switch(&mut self, on: bool, out: &mut impl HeaterOutput) {
        out.set_heater(on);
        self.output_on = on;
    }
}
