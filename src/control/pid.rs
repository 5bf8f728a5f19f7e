//! PID controller for the hot plate heater
//!
//! Fixed-cadence positional PID:
//!
//! ```text
//! power = Kp·e + Ki·Σe − Kd·(T_now − T_prev)
//! ```
//!
//! - No `dt`: the loop calls [`PidController::update`] at a fixed interval,
//!   so the derivative is a raw backward difference on the measurement.
//! - The derivative is *subtracted* (damping against a temperature already
//!   moving).
//! - Windup guard: Σe is clamped to ±(windup_guard_gain / Ki).  With
//!   `Ki == 0` the clamp is disabled rather than dividing by zero.
//!
//! Gains are persisted: every setter writes the new value through the
//! [`SlotStorage`] port after updating the in-memory copy.

use crate::app::ports::SlotStorage;
use crate::config::ControllerConfig;
use crate::error::StorageError;
use crate::settings::{SettingKey, load_or_default};

/// Proportional, integral, and derivative coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainSet {
    pub proportional: f32,
    pub integral: f32,
    pub derivative: f32,
}

/// Terms computed by the most recent update, for the debug readout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidTerms {
    pub proportional: f32,
    pub integral: f32,
    pub derivative: f32,
}

impl PidTerms {
    /// `P + I − D`.
    pub fn output(&self) -> f32 {
        self.proportional + self.integral - self.derivative
    }
}

/// PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    gains: GainSet,
    windup_guard_gain: f32,
    integral_state: f32,
    last_measurement: f32,
    terms: PidTerms,
}

impl PidController {
    pub fn new(gains: GainSet, windup_guard_gain: f32) -> Self {
        Self {
            gains,
            windup_guard_gain,
            integral_state: 0.0,
            last_measurement: 0.0,
            terms: PidTerms::default(),
        }
    }

    /// Restore gains from the slot store.  Unreadable or erased slots fall
    /// back to the factory defaults in `config`.
    pub fn load(store: &impl SlotStorage, config: &ControllerConfig) -> Self {
        let gains = GainSet {
            proportional: load_or_default(
                store,
                SettingKey::ProportionalGain,
                config.default_proportional,
            ),
            integral: load_or_default(store, SettingKey::IntegralGain, config.default_integral),
            derivative: load_or_default(
                store,
                SettingKey::DerivativeGain,
                config.default_derivative,
            ),
        };
        Self::new(gains, config.windup_guard_gain)
    }

    /// One fixed-interval step.  Returns the unclamped power command.
    pub fn update(&mut self, target: f32, current: f32) -> f32 {
        let error = target - current;

        let p = self.gains.proportional * error;

        self.integral_state += error;
        if let Some(guard) = self.windup_limit() {
            if self.integral_state > guard {
                self.integral_state = guard;
            } else if self.integral_state < -guard {
                self.integral_state = -guard;
            }
        }
        let i = self.gains.integral * self.integral_state;

        let d = self.gains.derivative * (current - self.last_measurement);
        self.last_measurement = current;

        self.terms = PidTerms {
            proportional: p,
            integral: i,
            derivative: d,
        };
        p + i - d
    }

    /// Bound on the integral accumulator, `None` while Ki is zero.
    pub fn windup_limit(&self) -> Option<f32> {
        if self.gains.integral == 0.0 {
            None
        } else {
            // A negative Ki would otherwise invert the clamp bounds.
            Some((self.windup_guard_gain / self.gains.integral).abs())
        }
    }

    /// Clear accumulated state; gains are untouched.
    pub fn reset(&mut self) {
        self.integral_state = 0.0;
        self.last_measurement = 0.0;
        self.terms = PidTerms::default();
    }

    // ── Gains ─────────────────────────────────────────────────

    pub fn gains(&self) -> GainSet {
        self.gains
    }

    pub fn proportional(&self) -> f32 {
        self.gains.proportional
    }

    pub fn integral(&self) -> f32 {
        self.gains.integral
    }

    pub fn derivative(&self) -> f32 {
        self.gains.derivative
    }

    pub fn set_proportional(
        &mut self,
        value: f32,
        store: &mut impl SlotStorage,
    ) -> Result<(), StorageError> {
        self.gains.proportional = value;
        store.write_f32(SettingKey::ProportionalGain, value)
    }

    pub fn set_integral(
        &mut self,
        value: f32,
        store: &mut impl SlotStorage,
    ) -> Result<(), StorageError> {
        self.gains.integral = value;
        store.write_f32(SettingKey::IntegralGain, value)
    }

    pub fn set_derivative(
        &mut self,
        value: f32,
        store: &mut impl SlotStorage,
    ) -> Result<(), StorageError> {
        self.gains.derivative = value;
        store.write_f32(SettingKey::DerivativeGain, value)
    }

    // ── Diagnostics ───────────────────────────────────────────

    pub fn terms(&self) -> PidTerms {
        self.terms
    }

    pub fn integral_state(&self) -> f32 {
        self.integral_state
    }

    pub fn last_measurement(&self) -> f32 {
        self.last_measurement
    }
}
