use super::SettingEvent;
use crate::traits::SettingsTransport;
use log::{debug, warn};
use std::sync::{mpsc, Arc};

/// Handle to the settings authority.
///
/// Cheap to clone; every clone shares one transport.  Asynchronous results
/// are delivered to the channel given at construction, which the owner
/// thread drains.
#[derive(Clone)]
pub struct SettingsClient {
    transport: Arc<dyn SettingsTransport>,
    events: mpsc::Sender<SettingEvent>,
}

impl SettingsClient {
    pub fn new(transport: Arc<dyn SettingsTransport>, events: mpsc::Sender<SettingEvent>) -> Self {
        Self { transport, events }
    }

    /// Read `key` without blocking the caller.
    ///
    /// Exactly one [`SettingEvent::Fetched`] for `key` follows, carrying
    /// the remote value or `fallback` if the read failed.
    pub fn fetch(&self, key: &str, fallback: &str) {
        let transport = Arc::clone(&self.transport);
        let events = self.events.clone();
        let key = key.to_string();
        let fallback = fallback.to_string();
        std::thread::spawn(move || {
            let value = read_or_fallback(transport.as_ref(), &key, fallback);
            let _ = events.send(SettingEvent::Fetched { key, value });
        });
    }

    /// Read `key`, waiting for the answer.  Failures yield `fallback`.
    pub fn fetch_blocking(&self, key: &str, fallback: &str) -> String {
        read_or_fallback(self.transport.as_ref(), key, fallback.to_string())
    }

    /// Write `key`.  Returns whether the authority accepted the value.
    pub fn store(&self, key: &str, value: &str) -> bool {
        match self.transport.set_setting(key, value) {
            Ok(()) => {
                debug!("stored {}", key);
                true
            }
            Err(e) => {
                warn!("failed to store {}: {}", key, e);
                false
            }
        }
    }

    /// Forward change broadcasts into the event channel from a dedicated
    /// thread.
    pub fn spawn_watcher(&self) -> std::thread::JoinHandle<()> {
        let transport = Arc::clone(&self.transport);
        let events = self.events.clone();
        std::thread::spawn(move || match transport.watch(events) {
            Ok(()) => debug!("settings watcher finished"),
            Err(e) => warn!("settings change notifications unavailable: {}", e),
        })
    }
}

fn read_or_fallback(transport: &dyn SettingsTransport, key: &str, fallback: String) -> String {
    match transport.get_setting(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("using fallback for {}: {}", key, e);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsError;
    use crate::settings::memory::MemoryTransport;
    use std::time::Duration;

    /// A transport whose every call fails.
    struct DownTransport;

    impl SettingsTransport for DownTransport {
        fn get_setting(&self, _key: &str) -> Result<String, SettingsError> {
            Err(SettingsError::Unavailable("down".into()))
        }

        fn set_setting(&self, _key: &str, _value: &str) -> Result<(), SettingsError> {
            Err(SettingsError::Unavailable("down".into()))
        }

        fn watch(&self, _sink: mpsc::Sender<SettingEvent>) -> Result<(), SettingsError> {
            Err(SettingsError::Unavailable("down".into()))
        }
    }

    #[test]
    fn fetch_delivers_remote_value_once() {
        let store = Arc::new(MemoryTransport::default());
        store.insert("a/b", "42");
        let (tx, rx) = mpsc::channel();
        let client = SettingsClient::new(store, tx);

        client.fetch("a/b", "0");
        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(ev, SettingEvent::Fetched { key: "a/b".into(), value: "42".into() });
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn unavailable_authority_yields_fallback() {
        let (tx, rx) = mpsc::channel();
        let client = SettingsClient::new(Arc::new(DownTransport), tx);

        client.fetch("x", "[]");
        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(ev.value(), "[]");
        assert_eq!(client.fetch_blocking("x", "fb"), "fb");
        assert!(!client.store("x", "1"));
    }

    #[test]
    fn store_then_fetch_blocking() {
        let (tx, _rx) = mpsc::channel();
        let client = SettingsClient::new(Arc::new(MemoryTransport::default()), tx);
        assert!(client.store("k", "v"));
        assert_eq!(client.fetch_blocking("k", "fb"), "v");
        assert_eq!(client.fetch_blocking("missing", "fb"), "fb");
    }
}
