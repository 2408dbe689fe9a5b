//! Client side of the remote settings authority.
//!
//! The authority is an opaque key → string store reached over a
//! [`SettingsTransport`](crate::traits::SettingsTransport): D-Bus in
//! production ([`dbus`]), an in-process map for tests and `--offline`
//! ([`memory`]).  Values reach the owner thread as [`SettingEvent`]s, which
//! the [`consumers`] turn into [`ShellEvent`](crate::traits::ShellEvent)s.

pub mod client;
pub mod consumers;
pub mod dbus;
pub mod memory;

pub use client::SettingsClient;

/// Persisted pinned dock entries.
pub const PINNED_APPS: &str = "dock/pinnedApps";
pub const WALLPAPER_COLOR: &str = "wallpaper/backgroundColor";
pub const WIFI_NETWORKS: &str = "network/wifiNetworks";
pub const BLUETOOTH_DEVICES: &str = "bluetooth/devices";
pub const LAUNCHER_APPS: &str = "launcher/apps";

/// A value arriving from the settings authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingEvent {
    /// Completion of a [`SettingsClient::fetch`]: the remote value, or the
    /// caller's fallback when the authority could not answer.
    Fetched { key: String, value: String },
    /// A `SettingChanged` broadcast.
    Changed { key: String, value: String },
}

impl SettingEvent {
    pub fn key(&self) -> &str {
        match self {
            SettingEvent::Fetched { key, .. } | SettingEvent::Changed { key, .. } => key,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SettingEvent::Fetched { value, .. } | SettingEvent::Changed { value, .. } => value,
        }
    }
}

/// Errors from talking to the settings authority.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No connection to the authority.
    #[error("settings service unavailable: {0}")]
    Unavailable(String),
    /// The authority answered with an error.
    #[error("settings call failed: {0}")]
    Call(String),
}

impl From<zbus::Error> for SettingsError {
    fn from(e: zbus::Error) -> Self {
        SettingsError::Call(e.to_string())
    }
}
