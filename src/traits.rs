//! Core traits that decouple the dock core from any specific window system,
//! process model, or settings transport.
//!
//! Every concrete backend (the local window table, `wmctrl`, real process
//! spawning, D-Bus, a test harness, …) implements one of these traits.  The
//! [`DockRegistry`](crate::registry::DockRegistry) and
//! [`RunningApps`](crate::windows::snapshot::RunningApps) only depend on
//! these abstractions.

use crate::command::Request;
use crate::desktop::catalogue::LauncherApp;
use crate::registry::DockItem;
use crate::settings::consumers::{BluetoothDevice, WifiNetwork};
use crate::settings::{SettingEvent, SettingsError};
use crate::surface::{SurfaceAction, SurfaceKind};
use crate::windows::arena::{WindowAction, WindowId};
use crate::windows::snapshot::SnapshotRow;
use serde::Serialize;
use std::sync::mpsc;

//  Windows

/// Control over top-level windows owned by the presentation layer.
///
/// Handles are non-owning: the window may disappear at any time, so every
/// method validates the handle first and [`is_alive`](Self::is_alive) lets
/// callers check before acting.
pub trait WindowControl {
    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// Whether `window` still refers to a live window.
    fn is_alive(&self, window: WindowId) -> bool;

    /// Whether the window is currently shown.
    fn is_visible(&self, window: WindowId) -> Result<bool, Self::Error>;

    /// Map the window if it is hidden.
    fn show(&self, window: WindowId) -> Result<(), Self::Error>;

    /// Stack the window above its siblings.
    fn raise(&self, window: WindowId) -> Result<(), Self::Error>;

    /// Give the window keyboard focus.
    fn focus(&self, window: WindowId) -> Result<(), Self::Error>;

    /// Ask the window to close.  Destruction is reported separately.
    fn close(&self, window: WindowId) -> Result<(), Self::Error>;
}

/// A window owned by this process, as seen by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalWindow {
    pub id: WindowId,
    pub title: String,
    pub visible: bool,
}

/// Enumeration of the windows owned by this process.
pub trait LocalWindows: WindowControl {
    /// Every known local window, in creation order.
    fn local_windows(&self) -> Vec<LocalWindow>;
}

/// An external helper that lists and activates windows of other clients.
pub trait WindowLister {
    /// The error type produced by this helper.
    type Error: std::error::Error + Send + 'static;

    /// Run the helper and return its raw listing (one window per line).
    ///
    /// Implementations must bound the time they wait.
    fn list_windows(&self) -> Result<String, Self::Error>;

    /// Raise and focus the external window with the given native id.
    fn activate(&self, window_id: u64) -> Result<(), Self::Error>;
}

//  Processes

/// Starting and stopping application processes.
pub trait ProcessControl {
    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// Start the desktop-entry `exec` line detached and return its pid.
    fn launch(&self, exec: &str) -> Result<u32, Self::Error>;

    /// Ask the process `pid` to terminate.
    fn terminate(&self, pid: u32) -> Result<(), Self::Error>;
}

//  Settings

/// The wire to the remote settings authority.
///
/// Implementations are shared between the owner thread and the worker
/// threads that complete asynchronous fetches, hence `Send + Sync`.
pub trait SettingsTransport: Send + Sync {
    /// Remote `GetSetting(key)`.
    fn get_setting(&self, key: &str) -> Result<String, SettingsError>;

    /// Remote `SetSetting(key, value)`.
    fn set_setting(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Forward every `SettingChanged` broadcast into `sink` as
    /// [`SettingEvent::Changed`].
    ///
    /// Blocks until the subscription ends.  Run it on a dedicated thread.
    fn watch(&self, sink: mpsc::Sender<SettingEvent>) -> Result<(), SettingsError>;
}

//  Command Source

/// A source of control [`Request`]s.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Request`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error>;
}

//  Events

/// Change notifications sent from the core to the presentation layer over
/// an [`mpsc`] channel.
///
/// Every list-valued event carries the complete new list and is only sent
/// when the list differs from the previously sent one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShellEvent {
    /// The poll-driven view of visible windows changed.
    RunningApps { rows: Vec<SnapshotRow> },
    /// The registry's running dock entries changed.
    DockApps { items: Vec<DockItem> },
    /// The pinned dock entries changed.
    PinnedApps { items: Vec<DockItem> },
    /// The built-in file manager should be opened by the shell.
    OpenFileManager,
    /// A request for the presentation layer to act on one of its windows.
    Window { window: WindowId, action: WindowAction },
    /// A request to show or hide one of the shell surfaces.
    Surface { kind: SurfaceKind, action: SurfaceAction },
    WallpaperColor { color: String },
    WifiNetworks { networks: Vec<WifiNetwork> },
    Bluetooth { powered: bool, devices: Vec<BluetoothDevice> },
    LauncherApps { apps: Vec<LauncherApp> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    //  Mock ProcessControl

    /// A test double that records every call made to it.
    #[derive(Debug, Default)]
    struct MockProcesses {
        launched: RefCell<Vec<String>>,
        terminated: RefCell<Vec<u32>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    impl ProcessControl for MockProcesses {
        type Error = MockError;

        fn launch(&self, exec: &str) -> Result<u32, MockError> {
            if exec.is_empty() {
                return Err(MockError);
            }
            self.launched.borrow_mut().push(exec.to_string());
            Ok(1000 + self.launched.borrow().len() as u32)
        }

        fn terminate(&self, pid: u32) -> Result<(), MockError> {
            self.terminated.borrow_mut().push(pid);
            Ok(())
        }
    }

    #[test]
    fn mock_processes_record_calls() {
        let p = MockProcesses::default();
        assert_eq!(p.launch("gedit").unwrap(), 1001);
        assert!(p.launch("").is_err());
        p.terminate(1001).unwrap();
        assert_eq!(*p.launched.borrow(), vec!["gedit".to_string()]);
        assert_eq!(*p.terminated.borrow(), vec![1001]);
    }

    //  Event wire format

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(ShellEvent::OpenFileManager).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "open_file_manager" }));

        let json = serde_json::to_value(ShellEvent::WallpaperColor { color: "#123456".into() }).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "wallpaper_color", "color": "#123456" }));
    }
}
