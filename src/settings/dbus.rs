//! [`SettingsTransport`] over the D-Bus session bus.
//!
//! The authority exposes `GetSetting(s) -> s`, `SetSetting(s, s)` and the
//! signal `SettingChanged(s, s)`.  Service, path and interface names come
//! from [`SettingsConfig`].

use super::{SettingEvent, SettingsError};
use crate::config::SettingsConfig;
use crate::traits::SettingsTransport;
use log::{info, warn};
use std::sync::mpsc;
use zbus::blocking::Connection;

#[zbus::proxy(
    interface = "org.shelldock.Settings",
    default_service = "org.shelldock.Settings",
    default_path = "/org/shelldock/Settings"
)]
trait Settings {
    fn get_setting(&self, key: &str) -> zbus::Result<String>;

    fn set_setting(&self, key: &str, value: &str) -> zbus::Result<()>;

    #[zbus(signal)]
    fn setting_changed(&self, key: String, value: String) -> zbus::Result<()>;
}

/// D-Bus backed settings transport.
///
/// Holds no connection when the session bus was unreachable at start-up;
/// every call then fails with [`SettingsError::Unavailable`] and callers use
/// their fallbacks.
pub struct DbusTransport {
    connection: Option<Connection>,
    config: SettingsConfig,
}

impl DbusTransport {
    /// Connect to the session bus.
    pub fn connect(config: &SettingsConfig) -> Self {
        match Connection::session() {
            Ok(connection) => {
                info!("connected to session bus for {}", config.service);
                Self {
                    connection: Some(connection),
                    config: config.clone(),
                }
            }
            Err(e) => {
                warn!("session bus unavailable, settings will use fallbacks: {}", e);
                Self::disconnected(config)
            }
        }
    }

    /// A transport with no bus connection.
    pub fn disconnected(config: &SettingsConfig) -> Self {
        Self {
            connection: None,
            config: config.clone(),
        }
    }

    fn proxy(&self) -> Result<SettingsProxyBlocking<'static>, SettingsError> {
        let connection = self
            .connection
            .as_ref()
            .ok_or_else(|| SettingsError::Unavailable("no session bus connection".into()))?;
        let proxy = SettingsProxyBlocking::builder(connection)
            .destination(self.config.service.clone())?
            .path(self.config.path.clone())?
            .interface(self.config.interface.clone())?
            .cache_properties(zbus::proxy::CacheProperties::No)
            .build()?;
        Ok(proxy)
    }
}

impl SettingsTransport for DbusTransport {
    fn get_setting(&self, key: &str) -> Result<String, SettingsError> {
        Ok(self.proxy()?.get_setting(key)?)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        Ok(self.proxy()?.set_setting(key, value)?)
    }

    fn watch(&self, sink: mpsc::Sender<SettingEvent>) -> Result<(), SettingsError> {
        let proxy = self.proxy()?;
        for signal in proxy.receive_setting_changed()? {
            let args = match signal.args() {
                Ok(args) => args,
                Err(e) => {
                    warn!("malformed SettingChanged signal: {}", e);
                    continue;
                }
            };
            let event = SettingEvent::Changed {
                key: args.key().to_string(),
                value: args.value().to_string(),
            };
            if sink.send(event).is_err() {
                break;
            }
        }
        Ok(())
    }
}
