//! Mock adapters for integration tests.
//!
//! Records every relay write and every emitted event so tests can assert on
//! the full history without touching real GPIO.

use hotplate::app::events::AppEvent;
use hotplate::app::ports::{EventSink, HeaterOutput, SlotStorage};
use hotplate::error::StorageError;
use hotplate::settings::SettingKey;

// ── Relay ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRelay {
    pub level: bool,
    pub writes: Vec<bool>,
}

impl HeaterOutput for MockRelay {
    fn set_heater(&mut self, on: bool) {
        self.level = on;
        self.writes.push(on);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Storage that always fails ─────────────────────────────────

#[derive(Default)]
pub struct FailingStore {
    pub write_attempts: usize,
}

impl SlotStorage for FailingStore {
    fn read_slot(&self, _key: SettingKey) -> Result<[u8; 4], StorageError> {
        Err(StorageError::IoError)
    }

    fn write_slot(&mut self, _key: SettingKey, _value: [u8; 4]) -> Result<(), StorageError> {
        self.write_attempts += 1;
        Err(StorageError::IoError)
    }
}
