//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by rendering each application event into a
//! fixed-capacity line buffer and writing it to the ESP-IDF logger (UART0
//! on the board).  Values print with two decimal places; heater power
//! prints as a whole number of milliseconds.

use core::fmt::{self, Write};

use heapless::String;
use log::{info, warn};

use crate::app::events::{AppEvent, StatusFormat, StatusReport};
use crate::app::ports::EventSink;

/// Longest rendered line.
pub const LINE_CAPACITY: usize = 160;

pub type LineBuf = String<LINE_CAPACITY>;

/// Console command reference, one entry per line.
pub const HELP_LINES: [&str; 12] = [
    "Send these characters for control:",
    "<space> : print status now",
    "u : toggle periodic status update",
    "g : toggle update style between human and graphing mode",
    "R : reset/initialize PID gain values",
    "b : print PID debug values",
    "? : print help",
    "+/- : adjust delta by a factor of ten",
    "P/p : up/down adjust p gain by delta",
    "I/i : up/down adjust i gain by delta",
    "D/d : up/down adjust d gain by delta",
    "T/t : up/down adjust set temp by delta",
];

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    line: LineBuf,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self {
            line: String::new(),
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        if let AppEvent::Help = event {
            for line in HELP_LINES {
                info!("{line}");
            }
            return;
        }
        self.line.clear();
        match render_line(event, &mut self.line) {
            Ok(()) => info!("{}", self.line),
            Err(_) => warn!("log_sink: line exceeded {LINE_CAPACITY} bytes"),
        }
    }
}

/// Render a single-line event.  [`AppEvent::Help`] renders its first line
/// only; the sink expands it.
pub fn render_line(event: &AppEvent, out: &mut impl Write) -> fmt::Result {
    match event {
        AppEvent::Status(report) => render_status(report, out),
        AppEvent::PidDebug { terms, power } => write!(
            out,
            "PID formula (P + I - D): {:.2} + {:.2} - {:.2} POWER: {:.0}",
            terms.proportional, terms.integral, terms.derivative, power
        ),
        AppEvent::Help => out.write_str(HELP_LINES[0]),
        AppEvent::SensorFault {
            consecutive_timeouts,
        } => write!(
            out,
            "FAULT | IR sensor silent ({consecutive_timeouts} timeouts), heater off"
        ),
        AppEvent::SensorRecovered => out.write_str("FAULT | IR sensor recovered"),
        AppEvent::Started => out.write_str(
            "Hot plate controller ready. Enter 'R' on first run to reset the stored gains, '?' for help.",
        ),
    }
}

fn render_status(s: &StatusReport, out: &mut impl Write) -> fmt::Result {
    match s.format {
        StatusFormat::Human => write!(
            out,
            " SET TEMP:{:.2}, CUR TEMP:{:.2}, GAINS p:{:.2} i:{:.2} d:{:.2}, Delta: {:.2}, Power: {:.0}",
            s.target_c,
            s.current_c,
            s.gains.proportional,
            s.gains.integral,
            s.gains.derivative,
            s.delta,
            s.power
        ),
        StatusFormat::Graph => write!(
            out,
            "{:.2}, {:.2}, {:.2}, {:.2}, {:.2}, {:.0}",
            s.target_c,
            s.current_c,
            s.gains.proportional,
            s.gains.integral,
            s.gains.derivative,
            s.power
        ),
    }
}
