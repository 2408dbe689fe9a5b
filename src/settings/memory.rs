//! In-process settings store, used by `--offline` and by tests.

use super::{SettingEvent, SettingsError};
use crate::traits::SettingsTransport;
use std::collections::HashMap;
use std::sync::{mpsc, Mutex};

/// A key → value map that behaves like the remote authority: writes are
/// broadcast to every watcher as [`SettingEvent::Changed`].
#[derive(Debug, Default)]
pub struct MemoryTransport {
    values: Mutex<HashMap<String, String>>,
    watchers: Mutex<Vec<mpsc::Sender<SettingEvent>>>,
}

impl MemoryTransport {
    /// Seed a value without notifying watchers.
    pub fn insert(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

impl SettingsTransport for MemoryTransport {
    fn get_setting(&self, key: &str) -> Result<String, SettingsError> {
        let values = self
            .values
            .lock()
            .map_err(|_| SettingsError::Unavailable("store poisoned".into()))?;
        values
            .get(key)
            .cloned()
            .ok_or_else(|| SettingsError::Call(format!("no value for {}", key)))
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .lock()
            .map_err(|_| SettingsError::Unavailable("store poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.retain(|tx| {
                tx.send(SettingEvent::Changed {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .is_ok()
            });
        }
        Ok(())
    }

    /// Registers `sink` and returns at once; the subscription lasts until
    /// the receiver is dropped.
    fn watch(&self, sink: mpsc::Sender<SettingEvent>) -> Result<(), SettingsError> {
        self.watchers
            .lock()
            .map_err(|_| SettingsError::Unavailable("store poisoned".into()))?
            .push(sink);
        Ok(())
    }
}
