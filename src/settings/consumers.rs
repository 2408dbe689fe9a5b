//! Settings keys the shell mirrors for the presentation layer.
//!
//! Each consumer owns one key: it names the fallback used when the authority
//! cannot answer, parses incoming values, and reports a [`ShellEvent`] only
//! when the parsed value differs from the last one applied.  Fetch results
//! and change broadcasts go through the same [`SettingConsumer::apply`].

use super::{BLUETOOTH_DEVICES, LAUNCHER_APPS, WALLPAPER_COLOR, WIFI_NETWORKS};
use crate::desktop::catalogue::{exec_program_key, file_manager_entry, icon_fields, normalize_id, scan_launcher_apps, LauncherApp};
use crate::launch::LaunchAction;
use crate::traits::ShellEvent;
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// A consumer of one settings key.
pub trait SettingConsumer {
    /// The key this consumer follows.
    fn key(&self) -> &'static str;

    /// Value used when the authority is unreachable.
    fn fallback(&self) -> &'static str;

    /// Apply a raw value.  Returns the event to emit, or `None` if nothing
    /// changed or the value was rejected.
    fn apply(&mut self, raw: &str) -> Option<ShellEvent>;
}

/// The consumers the shell runs, in start-up fetch order.
pub fn default_consumers(application_dirs: Vec<PathBuf>) -> Vec<Box<dyn SettingConsumer>> {
    vec![
        Box::new(WallpaperColor::default()),
        Box::new(WifiNetworks::default()),
        Box::new(BluetoothStatus::default()),
        Box::new(LauncherApps::new(application_dirs)),
    ]
}

fn str_field<'a>(o: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    o.get(key).and_then(Value::as_str)
}

//  Wallpaper

pub const DEFAULT_WALLPAPER_COLOR: &str = "#0081CD";

/// Whether `s` is a `#`-prefixed hex color with 3, 6, 8, 9 or 12 digits.
pub fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6 | 8 | 9 | 12) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Wallpaper background color.  Invalid colors are ignored.
#[derive(Debug, Default)]
pub struct WallpaperColor {
    current: Option<String>,
}

impl SettingConsumer for WallpaperColor {
    fn key(&self) -> &'static str {
        WALLPAPER_COLOR
    }

    fn fallback(&self) -> &'static str {
        DEFAULT_WALLPAPER_COLOR
    }

    fn apply(&mut self, raw: &str) -> Option<ShellEvent> {
        let color = raw.trim();
        if !is_hex_color(color) {
            debug!("ignoring invalid wallpaper color {:?}", raw);
            return None;
        }
        if self.current.as_deref() == Some(color) {
            return None;
        }
        self.current = Some(color.to_string());
        Some(ShellEvent::WallpaperColor {
            color: color.to_string(),
        })
    }
}

//  Wi-Fi

/// One visible wireless network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiNetwork {
    pub name: String,
    /// Signal strength in percent, `-1` when unknown.
    pub strength: i32,
}

/// Parse a network list.  Anything other than an array yields no networks.
pub fn parse_wifi_networks(raw: &str) -> Vec<WifiNetwork> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|o| {
            let name = str_field(o, "name").or_else(|| str_field(o, "ssid")).unwrap_or_default();
            let strength = ["strength", "signal"]
                .iter()
                .find_map(|k| o.get(*k).and_then(Value::as_f64))
                .map(|s| s as i32)
                .unwrap_or(-1);
            WifiNetwork {
                name: name.to_string(),
                strength,
            }
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct WifiNetworks {
    current: Option<Vec<WifiNetwork>>,
}

impl SettingConsumer for WifiNetworks {
    fn key(&self) -> &'static str {
        WIFI_NETWORKS
    }

    fn fallback(&self) -> &'static str {
        "[]"
    }

    fn apply(&mut self, raw: &str) -> Option<ShellEvent> {
        let next = parse_wifi_networks(raw);
        if self.current.as_ref() == Some(&next) {
            return None;
        }
        self.current = Some(next.clone());
        Some(ShellEvent::WifiNetworks { networks: next })
    }
}

//  Bluetooth

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BluetoothDevice {
    pub address: String,
    pub name: String,
    pub connected: bool,
}

/// Parse `{"powered": bool, "devices": [...]}`.  Anything other than an
/// object reads as powered off with no devices.
pub fn parse_bluetooth(raw: &str) -> (bool, Vec<BluetoothDevice>) {
    let Ok(Value::Object(root)) = serde_json::from_str::<Value>(raw) else {
        return (false, Vec::new());
    };
    let powered = root.get("powered").and_then(Value::as_bool).unwrap_or(false);
    let devices = root
        .get("devices")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_object)
                .map(|o| BluetoothDevice {
                    address: str_field(o, "address").unwrap_or_default().to_string(),
                    name: str_field(o, "name").unwrap_or_default().to_string(),
                    connected: o.get("connected").and_then(Value::as_bool).unwrap_or(false),
                })
                .collect()
        })
        .unwrap_or_default();
    (powered, devices)
}

#[derive(Debug, Default)]
pub struct BluetoothStatus {
    current: Option<(bool, Vec<BluetoothDevice>)>,
}

impl SettingConsumer for BluetoothStatus {
    fn key(&self) -> &'static str {
        BLUETOOTH_DEVICES
    }

    fn fallback(&self) -> &'static str {
        r#"{"powered":false,"devices":[]}"#
    }

    fn apply(&mut self, raw: &str) -> Option<ShellEvent> {
        let next = parse_bluetooth(raw);
        if self.current.as_ref() == Some(&next) {
            return None;
        }
        self.current = Some(next.clone());
        let (powered, devices) = next;
        Some(ShellEvent::Bluetooth { powered, devices })
    }
}

//  Launcher

/// Parse the authority's application list.  The result always starts with
/// the file-manager row; nameless entries are skipped.
pub fn parse_launcher_apps(raw: &str) -> Vec<LauncherApp> {
    let mut out = vec![file_manager_entry()];
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) else {
        return out;
    };
    for o in items.iter().filter_map(Value::as_object) {
        let field = |k: &str| str_field(o, k).unwrap_or_default().trim().to_string();
        let name = field("name");
        if name.is_empty() {
            continue;
        }
        let exec = field("exec");
        let mut app_id = field("id");
        if app_id.is_empty() {
            app_id = exec_program_key(&exec);
        }
        if app_id.is_empty() {
            app_id = normalize_id(&name);
        }
        let mut icon_source = field("iconSource");
        let mut icon_name = field("iconName");
        if icon_source.is_empty() && icon_name.is_empty() {
            (icon_source, icon_name) = icon_fields(&field("icon"));
        }
        out.push(LauncherApp {
            app_id,
            name,
            action: LaunchAction::Exec,
            exec,
            icon_source,
            icon_name,
        });
    }
    out
}

/// Launcher catalogue, from the authority or, when it has nothing to offer,
/// from a local descriptor scan.
#[derive(Debug)]
pub struct LauncherApps {
    dirs: Vec<PathBuf>,
    current: Option<Vec<LauncherApp>>,
}

impl LauncherApps {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs, current: None }
    }
}

impl SettingConsumer for LauncherApps {
    fn key(&self) -> &'static str {
        LAUNCHER_APPS
    }

    fn fallback(&self) -> &'static str {
        "[]"
    }

    fn apply(&mut self, raw: &str) -> Option<ShellEvent> {
        let mut next = parse_launcher_apps(raw);
        if next.len() <= 1 {
            debug!("authority offered no launcher apps, scanning locally");
            next = scan_launcher_apps(&self.dirs);
        }
        if self.current.as_ref() == Some(&next) {
            return None;
        }
        self.current = Some(next.clone());
        Some(ShellEvent::LauncherApps { apps: next })
    }
}
