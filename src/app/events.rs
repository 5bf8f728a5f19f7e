//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide how to render them; on the board that is the serial log.

use crate::control::pid::{GainSet, PidTerms};

/// Structured events emitted by the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Status snapshot, periodic or on request.
    Status(StatusReport),

    /// Terms of the last PID update and the heater command in effect.
    PidDebug { terms: PidTerms, power: f32 },

    /// Console command reference requested.
    Help,

    /// The IR sensor went silent and the heater interlock engaged.
    SensorFault { consecutive_timeouts: u32 },

    /// Frames resumed and the interlock released.
    SensorRecovered,

    /// The control loop has started.
    Started,
}

/// Layout used when rendering a [`StatusReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFormat {
    /// Labelled fields, one report per line.
    #[default]
    Human,
    /// Bare comma-separated values for serial plotters.
    Graph,
}

impl StatusFormat {
    pub fn toggled(self) -> Self {
        match self {
            Self::Human => Self::Graph,
            Self::Graph => Self::Human,
        }
    }
}

/// A point-in-time status snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub target_c: f32,
    /// Value of the last fresh temperature read.
    pub current_c: f32,
    pub gains: GainSet,
    /// Step applied by the nudge commands.
    pub delta: f32,
    /// Clamped heater command (on-ms per window).
    pub power: f32,
    pub format: StatusFormat,
}
