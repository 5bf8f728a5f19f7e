//! Controller configuration parameters
//!
//! Timing constants and factory defaults for the hot plate loop.
//! Gains and the target temperature are *not* here: they are tunables
//! persisted in the fixed-slot store (see [`crate::settings`]).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- PID ---
    /// Fixed PID update cadence (milliseconds). The derivative term is not
    /// time-normalised, so changing this retunes D.
    pub pid_update_interval_ms: u32,
    /// Integral accumulator is clamped to ±(windup_guard_gain / Ki).
    pub windup_guard_gain: f32,

    // --- IR sensor ---
    /// Silence (milliseconds) after which the decoder is reset.
    pub sensor_timeout_ms: u32,
    /// Consecutive timeouts tolerated before the heater is forced off.
    pub max_consecutive_timeouts: u32,

    // --- Heater ---
    /// Length of one time-proportioning window (milliseconds).
    pub heater_window_ms: u32,
    /// Upper bound of the heat command (on-milliseconds per window).
    pub max_heat_command: f32,

    // --- Telemetry ---
    /// Periodic status cadence (milliseconds).
    pub status_interval_ms: u32,

    // --- Factory defaults (applied by the `R` command) ---
    pub default_proportional: f32,
    pub default_integral: f32,
    pub default_derivative: f32,
    pub default_target_c: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // PID
            pid_update_interval_ms: 200, // 5 Hz
            windup_guard_gain: 100.0,

            // IR sensor
            sensor_timeout_ms: 1000,
            max_consecutive_timeouts: 20,

            // Heater
            heater_window_ms: 1000,
            max_heat_command: 1000.0,

            // Telemetry
            status_interval_ms: 200,

            // Factory defaults
            default_proportional: 30.0,
            default_integral: 0.0,
            default_derivative: 0.0,
            default_target_c: 200.0,
        }
    }
}

impl ControllerConfig {
    /// Reject values that would stall or destabilise the loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pid_update_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "pid_update_interval_ms must be > 0",
            ));
        }
        if !self.windup_guard_gain.is_finite() || self.windup_guard_gain <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "windup_guard_gain must be finite and > 0",
            ));
        }
        if self.sensor_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "sensor_timeout_ms must be > 0",
            ));
        }
        if self.heater_window_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "heater_window_ms must be > 0",
            ));
        }
        if !(self.max_heat_command > 0.0 && self.max_heat_command <= self.heater_window_ms as f32)
        {
            return Err(ConfigError::ValidationFailed(
                "max_heat_command must be within (0, heater_window_ms]",
            ));
        }
        if self.status_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "status_interval_ms must be > 0",
            ));
        }
        Ok(())
    }
}
