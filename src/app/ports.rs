//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (heater relay, clock, event sinks, slot storage)
//! implement these traits.  The [`ControlLoop`](super::service::ControlLoop)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! The IR data line has no port: it is sampled inside the clock ISR and
//! handed to [`BitstreamDecoder::on_clock_edge`](crate::sensors::ir_decoder::BitstreamDecoder::on_clock_edge)
//! as a plain `bool`.

use crate::error::StorageError;
use crate::settings::SettingKey;

// ───────────────────────────────────────────────────────────────
// Heater output port (driven adapter: domain → relay pin)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the heater relay.
pub trait HeaterOutput {
    /// Drive the relay: `true` = element energised.
    fn set_heater(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond counter that wraps at `u32::MAX`.
///
/// Consumers must treat `now < previous` as a wrap and reset their
/// reference point; the counter is never widened.
pub trait Clock {
    fn now_millis(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Slot storage port (driven adapter: domain ↔ EEPROM / NVS)
// ───────────────────────────────────────────────────────────────

/// Flat fixed-slot key-value store: one 4-byte value per [`SettingKey`].
///
/// Last write wins.  No transactional or wear-levelling guarantees.
pub trait SlotStorage {
    /// Read the four bytes stored at `key`.
    fn read_slot(&self, key: SettingKey) -> Result<[u8; 4], StorageError>;

    /// Overwrite the four bytes stored at `key`.
    fn write_slot(&mut self, key: SettingKey, value: [u8; 4]) -> Result<(), StorageError>;

    /// Read a slot as an `f32` (little-endian bit pattern).
    fn read_f32(&self, key: SettingKey) -> Result<f32, StorageError> {
        self.read_slot(key).map(f32::from_le_bytes)
    }

    /// Persist an `f32` bit-exactly.
    fn write_f32(&mut self, key: SettingKey, value: f32) -> Result<(), StorageError> {
        self.write_slot(key, value.to_le_bytes())
    }
}
