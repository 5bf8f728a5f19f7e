//! Integration tests for the fixed-slot settings store.

use hotplate::adapters::eeprom::EepromAdapter;
use hotplate::app::ports::SlotStorage;
use hotplate::config::ControllerConfig;
use hotplate::control::pid::PidController;
use hotplate::error::StorageError;
use hotplate::settings::{SettingKey, load_or_default};

use super::mock_hw::FailingStore;

#[test]
fn each_key_round_trips_independently() {
    let mut store = EepromAdapter::new();
    let values = [12.5_f32, -0.03125, 7.0e-6, 245.75];
    for (key, v) in SettingKey::ALL.into_iter().zip(values) {
        store.write_f32(key, v).unwrap();
    }
    for (key, v) in SettingKey::ALL.into_iter().zip(values) {
        assert_eq!(store.read_f32(key).unwrap().to_bits(), v.to_bits(), "{key:?}");
    }
}

#[test]
fn erased_and_unreadable_slots_fall_back() {
    let erased = EepromAdapter::new();
    assert_eq!(load_or_default(&erased, SettingKey::TargetTemperature, 200.0), 200.0);

    let broken = FailingStore::default();
    assert_eq!(broken.read_f32(SettingKey::IntegralGain), Err(StorageError::IoError));
    assert_eq!(load_or_default(&broken, SettingKey::IntegralGain, 0.5), 0.5);
}

#[test]
fn infinite_value_is_rejected_on_load() {
    let mut store = EepromAdapter::new();
    store.write_f32(SettingKey::ProportionalGain, f32::INFINITY).unwrap();
    let pid = PidController::load(&store, &ControllerConfig::default());
    assert_eq!(pid.proportional(), 30.0);
}

#[test]
fn gain_setters_write_their_own_slot() {
    let mut store = EepromAdapter::new();
    let mut pid = PidController::load(&store, &ControllerConfig::default());
    pid.set_derivative(4.25, &mut store).unwrap();

    assert_eq!(store.read_f32(SettingKey::DerivativeGain).unwrap(), 4.25);
    assert!(store.read_f32(SettingKey::ProportionalGain).unwrap().is_nan());
    assert!(store.read_f32(SettingKey::TargetTemperature).unwrap().is_nan());
}
