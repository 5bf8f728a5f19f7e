//! ZyTemp-style IR thermometer bitstream decoder.
//!
//! The sensor clocks out 8-bit words MSB-first; the data line is sampled
//! on every falling clock edge.  A message is four bytes
//! `[tag, high, mid, reserved]` followed by the terminator `0x0D`.
//!
//! ```text
//!   clock ISR ──▶ on_clock_edge() ──▶ partial ──(0x0D)──▶ frame + ready
//!                                                          │
//!   tick loop ◀── take_frame() ◀───────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Single producer (the clock ISR), single consumer (the tick loop).
//! Assembly state (`shift`, `bit_count`, `byte_count`, `partial`) is only
//! written by the ISR, except for [`BitstreamDecoder::reset`] which runs
//! inside a critical section.  A completed message is published as one
//! `AtomicU32` followed by a `Release` store of the ready flag, so the
//! consumer never observes a half-written frame.
//!
//! ## Edge behaviour
//!
//! - A terminator always completes a message, even after fewer than four
//!   bytes.  Slots that were not refilled keep the previous frame's bytes.
//! - Bytes past the fourth are dropped, but the byte index still advances.
//! - While a message is waiting, new bytes are not stored.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

/// Byte that ends every message.
pub const FRAME_TERMINATOR: u8 = 0x0D;
/// Bytes in a message, excluding the terminator.
pub const FRAME_LEN: usize = 4;

/// Channel tag of byte 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    /// Object (target surface) temperature.
    Object = 0x4c,
    /// Sensor ambient temperature.
    Ambient = 0x66,
}

/// A completed 4-byte message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFrame {
    bytes: [u8; FRAME_LEN],
}

impl SensorFrame {
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Unpack from the decoder's packed representation (byte 0 in the MSB).
    pub const fn from_packed(raw: u32) -> Self {
        Self {
            bytes: raw.to_be_bytes(),
        }
    }

    pub const fn bytes(&self) -> [u8; FRAME_LEN] {
        self.bytes
    }

    pub const fn tag(&self) -> u8 {
        self.bytes[0]
    }

    /// `None` for unrecognised tags; such frames are discarded.
    pub fn channel(&self) -> Option<Channel> {
        match self.tag() {
            0x4c => Some(Channel::Object),
            0x66 => Some(Channel::Ambient),
            _ => None,
        }
    }

    /// Raw reading in 1/16 K.
    pub const fn raw(&self) -> u16 {
        u16::from_be_bytes([self.bytes[1], self.bytes[2]])
    }

    /// Calibrated temperature in °C.
    pub fn celsius(&self) -> f32 {
        f32::from(self.raw()) / 16.0 - 273.15
    }
}

/// Interrupt-driven frame assembler.
///
/// `const`-constructible so the firmware can keep one in a `static` that
/// the ISR reaches without captures.
pub struct BitstreamDecoder {
    shift: AtomicU8,
    bit_count: AtomicU8,
    byte_count: AtomicU8,
    /// Message under assembly, byte 0 in the MSB.
    partial: AtomicU32,
    /// Last published message.
    frame: AtomicU32,
    frame_ready: AtomicBool,
    /// First byte received since the latch was last consumed.
    latched: AtomicU8,
    latch_full: AtomicBool,
}

impl Default for BitstreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BitstreamDecoder {
    pub const fn new() -> Self {
        Self {
            shift: AtomicU8::new(0),
            bit_count: AtomicU8::new(0),
            byte_count: AtomicU8::new(0),
            partial: AtomicU32::new(0),
            frame: AtomicU32::new(0),
            frame_ready: AtomicBool::new(false),
            latched: AtomicU8::new(0),
            latch_full: AtomicBool::new(false),
        }
    }

    /// Clock-edge handler.  Call once per falling edge of the sensor clock
    /// with the sampled data-line level.  Constant time, no allocation.
    pub fn on_clock_edge(&self, data_high: bool) {
        let shift = (self.shift.load(Ordering::Relaxed) << 1) | u8::from(data_high);
        let bits = self.bit_count.load(Ordering::Relaxed) + 1;
        if bits < 8 {
            self.shift.store(shift, Ordering::Relaxed);
            self.bit_count.store(bits, Ordering::Relaxed);
            return;
        }

        self.shift.store(0, Ordering::Relaxed);
        self.bit_count.store(0, Ordering::Relaxed);
        self.complete_byte(shift);
    }

    fn complete_byte(&self, byte: u8) {
        if !self.latch_full.load(Ordering::Acquire) {
            self.latched.store(byte, Ordering::Relaxed);
            self.latch_full.store(true, Ordering::Release);
        }

        if byte == FRAME_TERMINATOR {
            self.byte_count.store(0, Ordering::Relaxed);
            self.frame
                .store(self.partial.load(Ordering::Relaxed), Ordering::Relaxed);
            self.frame_ready.store(true, Ordering::Release);
        } else if !self.frame_ready.load(Ordering::Acquire) {
            let index = self.byte_count.load(Ordering::Relaxed);
            if (index as usize) < FRAME_LEN {
                let shift = 8 * (FRAME_LEN as u32 - 1 - u32::from(index));
                let partial = self.partial.load(Ordering::Relaxed);
                let partial = (partial & !(0xFF << shift)) | (u32::from(byte) << shift);
                self.partial.store(partial, Ordering::Relaxed);
            }
            self.byte_count
                .store(index.saturating_add(1), Ordering::Relaxed);
        }
    }

    /// True if a completed message is waiting for the consumer.
    pub fn is_frame_ready(&self) -> bool {
        self.frame_ready.load(Ordering::Acquire)
    }

    /// Consume the waiting message, if any.
    pub fn take_frame(&self) -> Option<SensorFrame> {
        critical_section::with(|_| {
            if self.frame_ready.load(Ordering::Acquire) {
                let raw = self.frame.load(Ordering::Relaxed);
                self.frame_ready.store(false, Ordering::Release);
                Some(SensorFrame::from_packed(raw))
            } else {
                None
            }
        })
    }

    /// Non-destructive diagnostic peek at the first byte latched since the
    /// latch was last cleared.
    pub fn latched_byte(&self) -> Option<u8> {
        if self.latch_full.load(Ordering::Acquire) {
            Some(self.latched.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Consume the latched byte so the next completed byte can be latched.
    pub fn take_latched_byte(&self) -> Option<u8> {
        critical_section::with(|_| {
            let byte = self.latched_byte();
            self.latch_full.store(false, Ordering::Release);
            byte
        })
    }

    /// Index of the next message byte (saturates; values ≥ 4 mean overflow).
    pub fn byte_count(&self) -> u8 {
        self.byte_count.load(Ordering::Relaxed)
    }

    /// Bits shifted into the current byte.
    pub fn bit_count(&self) -> u8 {
        self.bit_count.load(Ordering::Relaxed)
    }

    /// Drop all assembly state, the waiting flag, and the latch.
    ///
    /// The partial buffer keeps its bytes: a later short frame still
    /// reports whatever the previous message left there.
    pub fn reset(&self) {
        critical_section::with(|_| {
            self.shift.store(0, Ordering::Relaxed);
            self.bit_count.store(0, Ordering::Relaxed);
            self.byte_count.store(0, Ordering::Relaxed);
            self.frame_ready.store(false, Ordering::Release);
            self.latch_full.store(false, Ordering::Release);
        });
    }

    /// Clock a whole byte in MSB-first, as the sensor would.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_clock_byte(&self, byte: u8) {
        for bit in (0..8).rev() {
            self.on_clock_edge(byte & (1 << bit) != 0);
        }
    }

    /// Clock in a full message plus terminator.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_clock_frame(&self, bytes: &[u8]) {
        for &b in bytes {
            self.sim_clock_byte(b);
        }
        self.sim_clock_byte(FRAME_TERMINATOR);
    }
}
