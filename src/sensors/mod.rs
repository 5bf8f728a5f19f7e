//! Sensor subsystem — the IR thermometer decoder and its sampler.
//!
//! The decoder lives in a `static` because ISR callbacks in ESP-IDF cannot
//! capture closures; the sampler borrows it from the control loop.

pub mod ir_decoder;
pub mod ir_sensor;

use ir_decoder::BitstreamDecoder;

/// The board's single IR sensor decoder, fed by the clock-line ISR.
pub static IR_DECODER: BitstreamDecoder = BitstreamDecoder::new();

/// Called from the GPIO ISR on each falling edge of the IR clock with the
/// sampled data-line level.  Lock-free — safe in interrupt context.
pub fn ir_clock_isr_handler(data_high: bool) {
    IR_DECODER.on_clock_edge(data_high);
}
