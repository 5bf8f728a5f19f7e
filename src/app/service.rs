//! Control loop — the hexagonal core.
//!
//! [`ControlLoop`] owns the sampler, PID, heater driver, and safety
//! supervisor.  It exposes a hardware-agnostic API; all I/O flows through
//! port traits injected at call sites, so the whole loop runs against mock
//! adapters on the host.
//!
//! ```text
//!  BitstreamDecoder ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                       │       ControlLoop         │
//!    HeaterOutput ◀──── │ Sampler · PID · Safety    │ ◀─▶ SlotStorage
//!                       └──────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! 1. Sampler update (frame intake, timeout handling).
//! 2. PID step, every `pid_update_interval_ms`.
//! 3. Interlock: while the sensor is silent the heater command is zeroed,
//!    overriding the PID output of step 2.
//! 4. Heater window update drives the relay.
//! 5. Periodic status, when enabled.

use log::{info, warn};

use crate::config::ControllerConfig;
use crate::control::heater::HeaterActuator;
use crate::control::pid::PidController;
use crate::error::{SensorError, StorageError};
use crate::safety::SafetySupervisor;
use crate::sensors::ir_decoder::BitstreamDecoder;
use crate::sensors::ir_sensor::SensorSampler;
use crate::settings::{SettingKey, load_or_default};

use super::commands::{AppCommand, Step, Tunable};
use super::events::{AppEvent, StatusFormat, StatusReport};
use super::ports::{EventSink, HeaterOutput, SlotStorage};

/// Smallest adjustment step reachable with `-`.
pub const MIN_DELTA: f32 = 0.01;
/// Largest adjustment step reachable with `+`.
pub const MAX_DELTA: f32 = 100.0;
/// Adjustment step at power-up.
pub const INITIAL_DELTA: f32 = 1.0;

/// Fixed-interval scheduler on a wrapping millisecond counter.
///
/// Fires when strictly more than `interval` has elapsed, then advances the
/// reference by exactly one interval so the cadence does not drift with
/// loop jitter.  A counter wrap (`now < last`) restarts the reference at 0.
fn cadence_due(now_ms: u32, last_ms: &mut u32, interval_ms: u32) -> bool {
    if now_ms < *last_ms {
        *last_ms = 0;
    }
    if now_ms.wrapping_sub(*last_ms) > interval_ms {
        *last_ms = last_ms.wrapping_add(interval_ms);
        true
    } else {
        false
    }
}

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

/// The control loop orchestrates all domain logic.
pub struct ControlLoop<'a> {
    config: ControllerConfig,
    sampler: SensorSampler<'a>,
    pid: PidController,
    heater: HeaterActuator,
    safety: SafetySupervisor,
    target_c: f32,
    last_pid_ms: u32,
    last_status_ms: u32,
    delta: f32,
    auto_status: bool,
    format: StatusFormat,
    tick_count: u64,
}

impl<'a> ControlLoop<'a> {
    /// Build the loop, restoring gains and target from `store`.
    ///
    /// `now_ms` seeds the PID, status, and sensor-timeout references.
    pub fn new(
        config: ControllerConfig,
        decoder: &'a BitstreamDecoder,
        store: &impl SlotStorage,
        now_ms: u32,
    ) -> Self {
        let sampler = SensorSampler::new(decoder, config.sensor_timeout_ms, now_ms);
        let pid = PidController::load(store, &config);
        let heater = HeaterActuator::new(&config);
        let safety = SafetySupervisor::new(&config);
        let target_c = load_or_default(store, SettingKey::TargetTemperature, config.default_target_c);

        Self {
            config,
            sampler,
            pid,
            heater,
            safety,
            target_c,
            last_pid_ms: now_ms,
            last_status_ms: now_ms,
            delta: INITIAL_DELTA,
            auto_status: false,
            format: StatusFormat::Human,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "ControlLoop started: target {:.2} C, p={:.2} i={:.2} d={:.2}",
            self.target_c,
            self.pid.proportional(),
            self.pid.integral(),
            self.pid.derivative()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one main-loop iteration.  Call as often as possible; the PID and
    /// status cadences are derived from `now_ms`.
    pub fn tick(&mut self, now_ms: u32, out: &mut impl HeaterOutput, sink: &mut impl EventSink) {
        self.tick_count += 1;

        // 1. Sensor intake
        self.sampler.update(now_ms);

        // 2. PID step
        if cadence_due(now_ms, &mut self.last_pid_ms, self.config.pid_update_interval_ms) {
            let current = self.sampler.fresh_temp();
            let command = self.pid.update(self.target_c, current);
            self.heater.set_power(command);
        }

        // 3. Interlock
        let was_faulted = self.safety.has_faults();
        let faults = self.safety.evaluate(self.sampler.consecutive_timeouts());
        if faults != 0 {
            self.heater.set_power(0.0);
            if !was_faulted {
                let consecutive_timeouts = self.sampler.consecutive_timeouts();
                warn!(
                    "Safety fault! flags=0b{:08b}: {}",
                    faults,
                    SensorError::Fault { consecutive_timeouts }
                );
                sink.emit(&AppEvent::SensorFault { consecutive_timeouts });
            }
        } else if was_faulted {
            sink.emit(&AppEvent::SensorRecovered);
        }

        // 4. Relay
        self.heater.update(now_ms, out);

        // 5. Periodic status
        if cadence_due(now_ms, &mut self.last_status_ms, self.config.status_interval_ms)
            && self.auto_status
        {
            sink.emit(&AppEvent::Status(self.build_status()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one console command.  Storage failures are logged; the
    /// in-memory value still takes effect.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        store: &mut impl SlotStorage,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::ResetDefaults => {
                let c = &self.config;
                let (p, i, d, t) = (
                    c.default_proportional,
                    c.default_integral,
                    c.default_derivative,
                    c.default_target_c,
                );
                log_store_error(self.pid.set_proportional(p, store));
                log_store_error(self.pid.set_integral(i, store));
                log_store_error(self.pid.set_derivative(d, store));
                log_store_error(self.set_target(t, store));
                info!("Tunables reset to factory defaults");
            }
            AppCommand::Adjust(tunable, step) => {
                let by = step.sign() * self.delta;
                let result = match tunable {
                    Tunable::Proportional => {
                        self.pid.set_proportional(self.pid.proportional() + by, store)
                    }
                    Tunable::Integral => self.pid.set_integral(self.pid.integral() + by, store),
                    Tunable::Derivative => {
                        self.pid.set_derivative(self.pid.derivative() + by, store)
                    }
                    Tunable::Target => self.set_target(self.target_c + by, store),
                };
                log_store_error(result);
            }
            AppCommand::ScaleDelta(Step::Up) => {
                self.delta = (self.delta * 10.0).min(MAX_DELTA);
            }
            AppCommand::ScaleDelta(Step::Down) => {
                self.delta = (self.delta / 10.0).max(MIN_DELTA);
            }
            AppCommand::ToggleAutoStatus => self.auto_status = !self.auto_status,
            AppCommand::ToggleFormat => self.format = self.format.toggled(),
            AppCommand::PrintStatus => sink.emit(&AppEvent::Status(self.build_status())),
            AppCommand::PrintHelp => sink.emit(&AppEvent::Help),
            AppCommand::PrintPidDebug => sink.emit(&AppEvent::PidDebug {
                terms: self.pid.terms(),
                power: self.heater.power(),
            }),
        }
    }

    /// Set and persist the target temperature.
    pub fn set_target(
        &mut self,
        value: f32,
        store: &mut impl SlotStorage,
    ) -> Result<(), StorageError> {
        self.target_c = value;
        store.write_f32(SettingKey::TargetTemperature, value)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_status(&self) -> StatusReport {
        StatusReport {
            target_c: self.target_c,
            current_c: self.sampler.last_temp(),
            gains: self.pid.gains(),
            delta: self.delta,
            power: self.heater.power(),
            format: self.format,
        }
    }

    pub fn target(&self) -> f32 {
        self.target_c
    }

    /// Clamped heater command currently in effect.
    pub fn power(&self) -> f32 {
        self.heater.power()
    }

    pub fn is_heater_on(&self) -> bool {
        self.heater.is_on()
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn auto_status(&self) -> bool {
        self.auto_status
    }

    pub fn format(&self) -> StatusFormat {
        self.format
    }

    pub fn faults(&self) -> u8 {
        self.safety.faults()
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    pub fn sampler(&self) -> &SensorSampler<'a> {
        &self.sampler
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

fn log_store_error(result: Result<(), StorageError>) {
    if let Err(e) = result {
        warn!("settings write failed: {e}");
    }
}
