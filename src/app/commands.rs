//! Inbound commands to the control loop.
//!
//! The operator console is a byte stream: each received byte maps to at
//! most one [`AppCommand`]; anything unrecognised is dropped.

/// Persisted tunable targeted by a nudge command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tunable {
    Proportional,
    Integral,
    Derivative,
    Target,
}

/// Direction of a nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

impl Step {
    /// `+1.0` or `-1.0`.
    pub fn sign(self) -> f32 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }
}

/// Commands the console adapter can send into the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Restore factory gains and target, persisting each.
    ResetDefaults,

    /// Move a tunable by the current adjustment delta.
    Adjust(Tunable, Step),

    /// `+`: delta ×10.  `-`: delta ÷10.  Clamped to the delta range.
    ScaleDelta(Step),

    /// Toggle the periodic status report.
    ToggleAutoStatus,

    /// Toggle between the human-readable and graphing status layouts.
    ToggleFormat,

    /// Emit one status report now.
    PrintStatus,

    PrintHelp,

    /// Emit the P/I/D terms of the last update and the heater command.
    PrintPidDebug,
}

impl AppCommand {
    /// Decode one console byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        use Step::{Down, Up};
        use Tunable::{Derivative, Integral, Proportional, Target};

        let cmd = match byte {
            b'R' => Self::ResetDefaults,
            b'P' => Self::Adjust(Proportional, Up),
            b'p' => Self::Adjust(Proportional, Down),
            b'I' => Self::Adjust(Integral, Up),
            b'i' => Self::Adjust(Integral, Down),
            b'D' => Self::Adjust(Derivative, Up),
            b'd' => Self::Adjust(Derivative, Down),
            b'T' => Self::Adjust(Target, Up),
            b't' => Self::Adjust(Target, Down),
            b'+' => Self::ScaleDelta(Up),
            b'-' => Self::ScaleDelta(Down),
            b'u' => Self::ToggleAutoStatus,
            b'g' => Self::ToggleFormat,
            b' ' => Self::PrintStatus,
            b'?' => Self::PrintHelp,
            b'b' => Self::PrintPidDebug,
            _ => return None,
        };
        Some(cmd)
    }
}
