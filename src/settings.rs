//! Typed keys for the persisted tunables.
//!
//! The board keeps four `f32`s in EEPROM at byte offsets
//! 0, 4, 8 and 12.  [`SettingKey`] names those slots so nothing outside
//! the storage adapters deals in raw offsets.

use log::warn;

use crate::app::ports::SlotStorage;

/// Width of every slot in bytes.
pub const SLOT_SIZE: usize = 4;

/// Enumerated, strongly-typed storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SettingKey {
    ProportionalGain = 0,
    IntegralGain = 1,
    DerivativeGain = 2,
    TargetTemperature = 3,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        Self::ProportionalGain,
        Self::IntegralGain,
        Self::DerivativeGain,
        Self::TargetTemperature,
    ];

    /// Byte offset of this slot in a flat EEPROM image.
    pub const fn offset(self) -> usize {
        self as usize * SLOT_SIZE
    }

    /// Short name used as the NVS key on device.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProportionalGain => "pgain",
            Self::IntegralGain => "igain",
            Self::DerivativeGain => "dgain",
            Self::TargetTemperature => "target",
        }
    }
}

/// Read an `f32` slot, substituting `default` when the slot is missing,
/// unreadable, or holds a non-finite pattern (erased flash reads as NaN).
pub fn load_or_default(store: &impl SlotStorage, key: SettingKey, default: f32) -> f32 {
    match store.read_f32(key) {
        Ok(v) if v.is_finite() => v,
        Ok(v) => {
            warn!("settings: {} holds non-finite {v}, using {default}", key.name());
            default
        }
        Err(e) => {
            warn!("settings: {} unreadable ({e}), using {default}", key.name());
            default
        }
    }
}
