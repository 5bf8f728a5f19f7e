//! Safety supervisor.
//!
//! Runs **every tick after the PID step and before the heater update**.
//! While any fault bit is set the control loop forces the heater command to
//! zero, overriding whatever the PID just produced.
//!
//! ## Fault lifecycle
//!
//! 1. The IR sampler misses more than `max_consecutive_timeouts` frame
//!    windows in a row.
//! 2. The supervisor sets [`SafetyFault::SensorSilent`].
//! 3. Each tick the control loop zeroes the heater command.
//! 4. The first good frame resets the sampler's timeout counter; the next
//!    evaluation clears the bit and PID output flows to the heater again.
//!
//! There is no latch: recovery is automatic as soon as frames resume.

use crate::config::ControllerConfig;
use crate::error::SafetyFault;
use log::{error, info};

/// Safety supervisor.
pub struct SafetySupervisor {
    max_consecutive_timeouts: u32,
    /// Current fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            max_consecutive_timeouts: config.max_consecutive_timeouts,
            faults: 0,
        }
    }

    /// Evaluate the interlock against the sampler's timeout counter.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, consecutive_timeouts: u32) -> u8 {
        self.eval_fault(
            SafetyFault::SensorSilent,
            consecutive_timeouts > self.max_consecutive_timeouts,
        );
        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY FAULT SET: {fault}, heater forced off");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
