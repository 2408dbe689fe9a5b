//! Application configuration.
//!
//! The configuration is loaded from a JSON file, by default
//! `$XDG_CONFIG_HOME/shelldock/config.json`, or from the path passed with
//! `--config <path>`.  Each concern lives in its own top-level section so the
//! file can grow without breaking older files.
//!
//! # Example
//!
//! ```json
//! {
//!   "running_apps": {
//!     "poll_interval_ms": 1500,
//!     "helper": "wmctrl",
//!     "helper_timeout_ms": 500,
//!     "panel_class": "shelldock-panel"
//!   },
//!   "settings": { "service": "org.shelldock.Settings" },
//!   "desktop": { "application_dirs": ["/usr/share/applications"] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional; a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Running-apps poll and window helper settings.
    #[serde(default)]
    pub running_apps: RunningAppsConfig,

    /// Names of the remote settings service.
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Where application descriptors are looked up.
    #[serde(default)]
    pub desktop: DesktopConfig,
}

/// Running-apps poll settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningAppsConfig {
    /// Interval between snapshot refreshes (ms).
    pub poll_interval_ms: u64,
    /// Name or path of the external window-list helper, optionally behind a
    /// wrapper command such as `flatpak-spawn --host wmctrl`.
    pub helper: String,
    /// Longest time one helper run may take before it is killed (ms).
    pub helper_timeout_ms: u64,
    /// Window class of the shell's own panel, which never appears as a row.
    pub panel_class: String,
    /// Fixed identities for windows recognised by title or class.
    pub overrides: Vec<TitleOverride>,
}

impl RunningAppsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn helper_timeout(&self) -> Duration {
        Duration::from_millis(self.helper_timeout_ms)
    }
}

impl Default for RunningAppsConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1500,
            helper: "wmctrl".into(),
            helper_timeout_ms: 500,
            panel_class: "shelldock-panel".into(),
            overrides: vec![
                TitleOverride::new("File Manager", "filemanager", "builtin:folder"),
                TitleOverride::new("Settings", "settings", "builtin:settings"),
            ],
        }
    }
}

/// Maps windows whose title (or class) contains a fragment to a fixed dedup
/// key and icon source.  Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleOverride {
    pub title_contains: String,
    #[serde(default)]
    pub class_contains: Option<String>,
    pub key: String,
    pub icon_source: String,
}

impl TitleOverride {
    pub fn new(title_contains: &str, key: &str, icon_source: &str) -> Self {
        Self {
            title_contains: title_contains.into(),
            class_contains: None,
            key: key.into(),
            icon_source: icon_source.into(),
        }
    }

    pub fn matches_title(&self, title: &str) -> bool {
        contains_ignore_case(title, &self.title_contains)
    }

    /// External windows match on the resolved display name or on the class.
    pub fn matches_external(&self, display_name: &str, class: &str) -> bool {
        self.matches_title(display_name)
            || self
                .class_contains
                .as_deref()
                .is_some_and(|frag| contains_ignore_case(class, frag))
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// D-Bus names of the settings authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub service: String,
    pub path: String,
    pub interface: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            service: "org.shelldock.Settings".into(),
            path: "/org/shelldock/Settings".into(),
            interface: "org.shelldock.Settings".into(),
        }
    }
}

/// Descriptor lookup settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Replaces the standard XDG application directories when set.
    pub application_dirs: Option<Vec<PathBuf>>,
}

impl DesktopConfig {
    /// The directories to scan, in priority order.
    pub fn dirs(&self) -> Vec<PathBuf> {
        self.application_dirs
            .clone()
            .unwrap_or_else(crate::desktop::standard_application_dirs)
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/shelldock/config.json`, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("shelldock").join("config.json"))
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
