//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                        |
//! |------------|--------------|------------------------------------|
//! | `eeprom`   | SlotStorage  | NVS blobs / in-memory EEPROM image |
//! | `log_sink` | EventSink    | Serial log output                  |
//! | `time`     | Clock        | ESP32 high-resolution timer        |
//!
//! The heater relay adapter lives in [`crate::drivers::relay`] because it
//! wraps a GPIO driver directly.

pub mod eeprom;
pub mod log_sink;
pub mod time;
