//! GPIO / peripheral pin assignments for the hot plate controller board.
//!
//! Every driver references this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// IR thermometer (synchronous serial: sensor drives clock and data)
// ---------------------------------------------------------------------------

/// Digital input: sensor clock.  Data is sampled on the falling edge.
pub const IR_CLK_GPIO: i32 = 3;
/// Digital input: sensor data, MSB first.
pub const IR_DATA_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Heater
// ---------------------------------------------------------------------------

/// Digital output: zero-crossing SSR driving the hot plate element.
/// HIGH = element energised.
pub const HEAT_RELAY_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Operator console
// ---------------------------------------------------------------------------

/// UART carrying both the log output and single-byte commands.
pub const CONSOLE_UART: i32 = 0;
/// RX ring buffer for the console driver (bytes).
pub const CONSOLE_RX_BUFFER: i32 = 256;
