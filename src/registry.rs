//! The dock's registry of running and pinned applications.
//!
//! [`DockRegistry`] keeps running entries in registration order and the
//! pinned entries in their persisted order.  It reacts to explicit
//! registrations, window destruction, activation requests and pinned-list
//! values from the settings authority, and issues calls to the
//! [`WindowControl`] and [`ProcessControl`] traits.  Exported lists are
//! re-derived after every mutation and sent as [`ShellEvent`]s only when
//! they changed.

use crate::launch::{LaunchAction, FILE_MANAGER_ID};
use crate::pinned::{parse_pinned, serialize_pinned, PinnedEntry};
use crate::settings::{SettingEvent, SettingsClient, PINNED_APPS};
use crate::traits::{ProcessControl, ShellEvent, WindowControl};
use crate::windows::arena::WindowId;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::mpsc;

/// Possible errors from the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Acting on a window failed.
    #[error("window error: {0}")]
    Window(String),
    /// Starting or signalling a process failed.
    #[error("process error: {0}")]
    Process(String),
}

/// Identity of an application as supplied by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    pub app_id: String,
    pub display_name: String,
    pub icon_source: String,
    pub icon_name: String,
    pub exec: String,
}

impl From<&PinnedEntry> for AppInfo {
    fn from(p: &PinnedEntry) -> Self {
        Self {
            app_id: p.app_id.clone(),
            display_name: p.text.clone(),
            icon_source: p.icon_source.clone(),
            icon_name: p.icon_name.clone(),
            exec: p.exec.clone(),
        }
    }
}

/// One exported dock row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DockItem {
    pub app_id: String,
    pub text: String,
    pub icon_source: String,
    pub icon_name: String,
}

#[derive(Debug, Clone)]
struct RunningEntry {
    info: AppInfo,
    /// `0` when no process is known.
    pid: u32,
    window: Option<WindowId>,
}

impl RunningEntry {
    fn item(&self) -> DockItem {
        DockItem {
            app_id: self.info.app_id.clone(),
            text: self.info.display_name.clone(),
            icon_source: self.info.icon_source.clone(),
            icon_name: self.info.icon_name.clone(),
        }
    }
}

fn pinned_item(p: &PinnedEntry) -> DockItem {
    DockItem {
        app_id: p.app_id.clone(),
        text: p.text.clone(),
        icon_source: p.icon_source.clone(),
        icon_name: p.icon_name.clone(),
    }
}

fn clean_id(app_id: &str) -> Option<&str> {
    let id = app_id.trim();
    (!id.is_empty()).then_some(id)
}

/// Registry of running and pinned dock entries.
///
/// Generic over the window and process backends so tests can record every
/// call instead of touching real windows and processes.
pub struct DockRegistry<W: WindowControl, P: ProcessControl> {
    windows: W,
    processes: P,
    settings: SettingsClient,
    running: HashMap<String, RunningEntry>,
    order: Vec<String>,
    pinned: Vec<PinnedEntry>,
    exported: Vec<DockItem>,
    exported_pinned: Vec<DockItem>,
    events: Option<mpsc::Sender<ShellEvent>>,
}

impl<W: WindowControl, P: ProcessControl> DockRegistry<W, P> {
    /// Create an empty registry and request the persisted pinned list.
    ///
    /// The list arrives later as a [`SettingEvent`] that must be passed to
    /// [`handle_setting`](Self::handle_setting).
    pub fn new(windows: W, processes: P, settings: SettingsClient) -> Self {
        settings.fetch(PINNED_APPS, "[]");
        Self {
            windows,
            processes,
            settings,
            running: HashMap::new(),
            order: Vec::new(),
            pinned: Vec::new(),
            exported: Vec::new(),
            exported_pinned: Vec::new(),
            events: None,
        }
    }

    /// Attach the channel that receives dock events.
    pub fn set_events(&mut self, tx: mpsc::Sender<ShellEvent>) {
        self.events = Some(tx);
    }

    /// Running entries in registration order.
    pub fn apps(&self) -> &[DockItem] {
        &self.exported
    }

    /// Pinned entries in pinned order.
    pub fn pinned_apps(&self) -> &[DockItem] {
        &self.exported_pinned
    }

    /// The pid recorded for a running entry, if any.
    pub fn pid_of(&self, app_id: &str) -> Option<u32> {
        self.running.get(app_id.trim()).map(|e| e.pid).filter(|&pid| pid > 0)
    }

    fn emit(&self, event: ShellEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    //  Running entries

    /// Record an application started with process id `pid` (`0` if
    /// unknown).  Re-registration overwrites the entry in place; a zero pid
    /// never clears a known one.
    pub fn register_launched_app(&mut self, app: AppInfo, pid: u32) {
        self.upsert(app, pid, None);
    }

    /// Record an application shown in `window`.  Its destruction, reported
    /// via [`window_destroyed`](Self::window_destroyed), unregisters the
    /// entry.
    pub fn register_window(&mut self, app: AppInfo, window: WindowId) {
        if !self.windows.is_alive(window) {
            debug!("ignoring registration with stale window {:?}", window);
            return;
        }
        self.upsert(app, 0, Some(window));
    }

    fn upsert(&mut self, mut app: AppInfo, pid: u32, window: Option<WindowId>) {
        let Some(id) = clean_id(&app.app_id).map(str::to_string) else {
            return;
        };
        app.app_id = id.clone();
        match self.running.get_mut(&id) {
            Some(entry) => {
                entry.info = app;
                if pid > 0 {
                    entry.pid = pid;
                }
                if window.is_some() {
                    entry.window = window;
                }
            }
            None => {
                self.order.push(id.clone());
                self.running.insert(id, RunningEntry { info: app, pid, window });
            }
        }
        self.publish_running();
    }

    /// Remove a running entry.
    pub fn unregister_app(&mut self, app_id: &str) {
        let Some(id) = clean_id(app_id) else {
            return;
        };
        if self.running.remove(id).is_some() {
            self.order.retain(|o| o != id);
            self.publish_running();
        }
    }

    /// Drop every entry bound to a destroyed window.
    pub fn window_destroyed(&mut self, window: WindowId) {
        let before = self.order.len();
        self.running.retain(|_, e| e.window != Some(window));
        let running = &self.running;
        self.order.retain(|id| running.contains_key(id));
        if self.order.len() != before {
            debug!("window {:?} destroyed, {} entr(y/ies) removed", window, before - self.order.len());
            self.publish_running();
        }
    }

    fn publish_running(&mut self) {
        let next: Vec<DockItem> = self
            .order
            .iter()
            .filter_map(|id| self.running.get(id))
            .map(RunningEntry::item)
            .collect();
        if next != self.exported {
            self.exported = next;
            self.emit(ShellEvent::DockApps {
                items: self.exported.clone(),
            });
        }
    }

    fn live_window(&self, app_id: &str) -> Option<WindowId> {
        self.running
            .get(app_id)?
            .window
            .filter(|w| self.windows.is_alive(*w))
    }

    //  Activation

    /// Bring a running application forward, start it again, or open the
    /// file manager, depending on what the entry has.  Unknown ids are
    /// ignored.
    pub fn activate_app(&mut self, app_id: &str) -> Result<(), RegistryError> {
        let Some(id) = clean_id(app_id) else {
            return Ok(());
        };
        let Some(entry) = self.running.get(id) else {
            debug!("activate: {} is not running", id);
            return Ok(());
        };

        if let Some(window) = self.live_window(id) {
            let visible = self.windows.is_visible(window).map_err(window_err)?;
            if !visible {
                self.windows.show(window).map_err(window_err)?;
            }
            self.windows.raise(window).map_err(window_err)?;
            self.windows.focus(window).map_err(window_err)?;
        } else if !entry.info.exec.trim().is_empty() {
            let pid = self.processes.launch(&entry.info.exec).map_err(process_err)?;
            debug!("activate: relaunched {} (pid {})", id, pid);
        } else if id == FILE_MANAGER_ID {
            self.emit(ShellEvent::OpenFileManager);
        }
        Ok(())
    }

    /// Activate a pinned entry.  A running entry with the same id takes
    /// precedence; otherwise the pinned exec line is launched and the result
    /// registered as running.
    pub fn activate_pinned(&mut self, app_id: &str) -> Result<(), RegistryError> {
        let Some(id) = clean_id(app_id) else {
            return Ok(());
        };
        if self.running.contains_key(id) {
            return self.activate_app(id);
        }
        let Some(pinned) = self.pinned.iter().find(|p| p.app_id == id).cloned() else {
            return Ok(());
        };
        if !pinned.exec.trim().is_empty() {
            let pid = self.processes.launch(&pinned.exec).map_err(process_err)?;
            info!("launched pinned {} (pid {})", id, pid);
            self.register_launched_app(AppInfo::from(&pinned), pid);
        } else if id == FILE_MANAGER_ID {
            self.emit(ShellEvent::OpenFileManager);
        }
        Ok(())
    }

    /// Close a running application through its window, or failing that its
    /// process.  The entry is unregistered either way.
    pub fn close_app(&mut self, app_id: &str) -> Result<(), RegistryError> {
        let Some(id) = clean_id(app_id).map(str::to_string) else {
            return Ok(());
        };
        let result = if let Some(window) = self.live_window(&id) {
            self.windows.close(window).map_err(window_err)
        } else {
            match self.pid_of(&id) {
                Some(pid) => self.processes.terminate(pid).map_err(process_err),
                None => return Ok(()),
            }
        };
        self.unregister_app(&id);
        result
    }

    /// Launcher activation.  The file-manager action registers the
    /// file-manager entry and asks the shell to open it; the exec action
    /// launches and registers with the new pid.
    pub fn launch_entry(&mut self, action: LaunchAction, mut app: AppInfo) -> Result<(), RegistryError> {
        match action {
            LaunchAction::FileManager => {
                if app.app_id.trim().is_empty() {
                    app.app_id = FILE_MANAGER_ID.into();
                }
                app.exec.clear();
                self.register_launched_app(app, 0);
                self.emit(ShellEvent::OpenFileManager);
                Ok(())
            }
            LaunchAction::Exec => match self.processes.launch(&app.exec) {
                Ok(pid) => {
                    self.register_launched_app(app, pid);
                    Ok(())
                }
                Err(e) => {
                    warn!("failed to launch {}: {}", app.app_id, e);
                    Err(process_err(e))
                }
            },
        }
    }

    //  Pinned entries

    pub fn is_pinned(&self, app_id: &str) -> bool {
        let id = app_id.trim();
        self.pinned.iter().any(|p| p.app_id == id)
    }

    /// Pin a running entry.  Returns whether the pinned set changed.
    pub fn pin_app(&mut self, app_id: &str) -> bool {
        let Some(id) = clean_id(app_id) else {
            return false;
        };
        if self.is_pinned(id) {
            return false;
        }
        let Some(entry) = self.running.get(id) else {
            debug!("pin: {} is not running", id);
            return false;
        };
        self.pinned.push(PinnedEntry {
            app_id: id.to_string(),
            text: entry.info.display_name.clone(),
            icon_source: entry.info.icon_source.clone(),
            icon_name: entry.info.icon_name.clone(),
            exec: entry.info.exec.clone(),
        });
        self.publish_pinned();
        self.persist_pinned();
        true
    }

    /// Unpin an entry.  Returns whether the pinned set changed.
    pub fn unpin_app(&mut self, app_id: &str) -> bool {
        let id = app_id.trim();
        let before = self.pinned.len();
        self.pinned.retain(|p| p.app_id != id);
        if self.pinned.len() == before {
            return false;
        }
        self.publish_pinned();
        self.persist_pinned();
        true
    }

    fn persist_pinned(&self) {
        if !self.settings.store(PINNED_APPS, &serialize_pinned(&self.pinned)) {
            warn!("pinned list not persisted");
        }
    }

    /// Feed a settings value to the registry.  Returns whether it was the
    /// pinned list.
    pub fn handle_setting(&mut self, event: &SettingEvent) -> bool {
        if event.key() != PINNED_APPS {
            return false;
        }
        self.apply_pinned_raw(event.value());
        true
    }

    /// Replace the pinned set with a serialized list.  Unparsable input
    /// keeps the current set.
    pub fn apply_pinned_raw(&mut self, raw: &str) {
        match parse_pinned(raw) {
            Some(entries) => {
                self.pinned = entries;
                self.publish_pinned();
            }
            None => warn!("keeping current pinned apps"),
        }
    }

    fn publish_pinned(&mut self) {
        let next: Vec<DockItem> = self.pinned.iter().map(pinned_item).collect();
        if next != self.exported_pinned {
            self.exported_pinned = next;
            self.emit(ShellEvent::PinnedApps {
                items: self.exported_pinned.clone(),
            });
        }
    }
}

fn window_err<E: std::error::Error>(e: E) -> RegistryError {
    RegistryError::Window(e.to_string())
}

fn process_err<E: std::error::Error>(e: E) -> RegistryError {
    RegistryError::Process(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::memory::MemoryTransport;
    use crate::traits::SettingsTransport;
    use crate::windows::arena::{WindowAction, WindowTable};
    use std::cell::RefCell;
    use std::sync::Arc;
    use std::time::Duration;

    //  Recording process backend

    #[derive(Debug, Default)]
    struct RecorderProcesses {
        launched: RefCell<Vec<String>>,
        terminated: RefCell<Vec<u32>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("recorder error")]
    struct RecorderErr;

    impl ProcessControl for RecorderProcesses {
        type Error = RecorderErr;

        fn launch(&self, exec: &str) -> Result<u32, RecorderErr> {
            if exec.contains("fail") {
                return Err(RecorderErr);
            }
            self.launched.borrow_mut().push(exec.to_string());
            Ok(4000 + self.launched.borrow().len() as u32)
        }

        fn terminate(&self, pid: u32) -> Result<(), RecorderErr> {
            self.terminated.borrow_mut().push(pid);
            Ok(())
        }
    }

    struct Harness {
        registry: DockRegistry<WindowTable, RecorderProcesses>,
        table: WindowTable,
        store: Arc<MemoryTransport>,
        events: mpsc::Receiver<ShellEvent>,
        settings: mpsc::Receiver<SettingEvent>,
    }

    impl Harness {
        fn with_store(store: Arc<MemoryTransport>) -> Self {
            let (ev_tx, events) = mpsc::channel();
            let (set_tx, settings) = mpsc::channel();
            let table = WindowTable::with_requests(ev_tx.clone());
            let client = SettingsClient::new(store.clone(), set_tx);
            let mut registry = DockRegistry::new(table.clone(), RecorderProcesses::default(), client);
            registry.set_events(ev_tx);
            Self {
                registry,
                table,
                store,
                events,
                settings,
            }
        }

        fn new() -> Self {
            Self::with_store(Arc::new(MemoryTransport::default()))
        }

        /// Deliver the initial pinned-list fetch.
        fn deliver_fetch(&mut self) {
            let ev = self.settings.recv_timeout(Duration::from_secs(2)).unwrap();
            assert!(matches!(ev, SettingEvent::Fetched { .. }));
            self.registry.handle_setting(&ev);
        }

        fn drain(&self) -> Vec<ShellEvent> {
            self.events.try_iter().collect()
        }
    }

    fn app(id: &str, exec: &str) -> AppInfo {
        AppInfo {
            app_id: id.into(),
            display_name: id.to_uppercase(),
            exec: exec.into(),
            ..AppInfo::default()
        }
    }

    fn ids(items: &[DockItem]) -> Vec<&str> {
        items.iter().map(|i| i.app_id.as_str()).collect()
    }

    #[test]
    fn registration_keeps_order_and_notifies_on_change() {
        let mut h = Harness::new();
        h.registry.register_launched_app(app("a", "a"), 10);
        h.registry.register_launched_app(app("b", "b"), 11);
        h.registry.register_launched_app(app("a", "a"), 0);
        assert_eq!(ids(h.registry.apps()), vec!["a", "b"]);
        assert_eq!(h.registry.pid_of("a"), Some(10));

        let dock_events = h
            .drain()
            .into_iter()
            .filter(|e| matches!(e, ShellEvent::DockApps { .. }))
            .count();
        // The identical re-registration did not notify.
        assert_eq!(dock_events, 2);

        h.registry.unregister_app("a");
        assert_eq!(ids(h.registry.apps()), vec!["b"]);
        assert!(matches!(h.drain().as_slice(), [ShellEvent::DockApps { items }] if items.len() == 1));
    }

    #[test]
    fn blank_ids_are_ignored() {
        let mut h = Harness::new();
        h.registry.register_launched_app(app("  ", "x"), 1);
        h.registry.unregister_app("");
        assert!(!h.registry.pin_app(" "));
        h.registry.activate_pinned("").unwrap();
        assert!(h.registry.apps().is_empty());
        assert!(h.drain().is_empty());
    }

    #[test]
    fn pinned_list_round_trips_through_the_store() {
        let store = Arc::new(MemoryTransport::default());
        {
            let mut h = Harness::with_store(store.clone());
            h.deliver_fetch();
            h.registry.register_launched_app(app("ed", "editor"), 5);
            assert!(h.registry.pin_app("ed"));
            assert!(!h.registry.pin_app("ed"));
            assert!(h.registry.is_pinned("ed"));
        }
        let persisted = store.get_setting(PINNED_APPS).unwrap();
        assert!(persisted.contains("\"appId\":\"ed\""));

        let mut h = Harness::with_store(store);
        h.deliver_fetch();
        assert!(h.registry.is_pinned("ed"));
        assert_eq!(h.registry.pinned_apps()[0].text, "ED");
        assert!(h.registry.apps().is_empty());
    }

    #[test]
    fn pinned_entry_keeps_every_field_of_the_running_entry() {
        let store = Arc::new(MemoryTransport::default());
        let running = AppInfo {
            app_id: "ed".into(),
            display_name: String::new(),
            icon_source: "file:///opt/ed.png".into(),
            icon_name: "ed".into(),
            exec: "ed --new".into(),
        };
        let running_item = {
            let mut h = Harness::with_store(store.clone());
            h.deliver_fetch();
            h.registry.register_launched_app(running.clone(), 5);
            assert!(h.registry.pin_app("ed"));
            h.registry.apps()[0].clone()
        };
        assert_eq!(running_item.text, "");

        let persisted = parse_pinned(&store.get_setting(PINNED_APPS).unwrap()).unwrap();
        assert_eq!(
            persisted,
            vec![PinnedEntry {
                app_id: "ed".into(),
                text: String::new(),
                icon_source: "file:///opt/ed.png".into(),
                icon_name: "ed".into(),
                exec: "ed --new".into(),
            }]
        );

        let mut h = Harness::with_store(store);
        h.deliver_fetch();
        assert_eq!(h.registry.pinned_apps(), &[running_item][..]);
        assert_eq!(AppInfo::from(&persisted[0]), running);
    }

    #[test]
    fn pinned_push_is_idempotent_and_malformed_keeps_pins() {
        let mut h = Harness::new();
        h.deliver_fetch();
        let raw = r#"[{"appId":"a","text":"A"},{"appId":"a","text":"dup"}]"#;
        h.registry.apply_pinned_raw(raw);
        h.registry.handle_setting(&SettingEvent::Changed {
            key: PINNED_APPS.into(),
            value: raw.into(),
        });
        let pinned_events = h
            .drain()
            .into_iter()
            .filter(|e| matches!(e, ShellEvent::PinnedApps { .. }))
            .count();
        assert_eq!(pinned_events, 1);
        assert_eq!(h.registry.pinned_apps()[0].text, "A");

        h.registry.apply_pinned_raw("{ broken");
        assert!(h.registry.is_pinned("a"));
        assert!(h.drain().is_empty());
    }

    #[test]
    fn unpin_persists_and_notifies() {
        let mut h = Harness::new();
        h.deliver_fetch();
        h.registry.register_launched_app(app("x", "x"), 0);
        h.registry.pin_app("x");
        h.drain();
        assert!(h.registry.unpin_app("x"));
        assert!(!h.registry.unpin_app("x"));
        assert_eq!(h.store.get_setting(PINNED_APPS).unwrap(), "[]");
        assert!(matches!(h.drain().as_slice(), [ShellEvent::PinnedApps { items }] if items.is_empty()));
    }

    #[test]
    fn activate_pinned_launches_and_registers() {
        let mut h = Harness::new();
        h.deliver_fetch();
        h.registry.apply_pinned_raw(r#"[{"appId":"term","text":"Term","exec":"xterm"},{"appId":"fileManager","text":"Files"}]"#);
        h.drain();

        h.registry.activate_pinned("term").unwrap();
        assert_eq!(*h.registry.processes.launched.borrow(), vec!["xterm".to_string()]);
        assert_eq!(h.registry.pid_of("term"), Some(4001));

        // Now running: the running entry wins, which relaunches via exec.
        h.registry.activate_pinned("term").unwrap();
        assert_eq!(h.registry.processes.launched.borrow().len(), 2);
        assert_eq!(ids(h.registry.apps()), vec!["term"]);

        h.drain();
        h.registry.activate_pinned("fileManager").unwrap();
        assert_eq!(h.drain(), vec![ShellEvent::OpenFileManager]);
    }

    #[test]
    fn activate_pinned_unknown_is_silent() {
        let mut h = Harness::new();
        h.deliver_fetch();
        h.registry.activate_pinned("nope").unwrap();
        assert!(h.drain().is_empty());
        assert!(h.registry.processes.launched.borrow().is_empty());
    }

    #[test]
    fn failed_launch_registers_nothing() {
        let mut h = Harness::new();
        assert!(h.registry.launch_entry(LaunchAction::Exec, app("bad", "fail")).is_err());
        assert!(h.registry.apps().is_empty());
    }

    #[test]
    fn activate_app_shows_raises_and_focuses_window() {
        let mut h = Harness::new();
        let w = h.table.open("Editor", false);
        h.registry.register_window(app("ed", ""), w);
        h.drain();

        h.registry.activate_app("ed").unwrap();
        let actions: Vec<WindowAction> = h
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                ShellEvent::Window { action, .. } => Some(action),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec![WindowAction::Show, WindowAction::Raise, WindowAction::Focus]);
        // An entry activated through its window is not relaunched.
        assert!(h.registry.processes.launched.borrow().is_empty());
    }

    #[test]
    fn activate_app_without_window_launches_without_registering() {
        let mut h = Harness::new();
        h.registry.register_launched_app(app("ed", "editor --new"), 0);
        h.registry.activate_app("ed").unwrap();
        assert_eq!(*h.registry.processes.launched.borrow(), vec!["editor --new".to_string()]);
        assert_eq!(h.registry.pid_of("ed"), None);
    }

    #[test]
    fn close_by_pid_terminates_and_unregisters() {
        let mut h = Harness::new();
        h.registry.register_launched_app(app("ed", "editor"), 77);
        h.registry.close_app("ed").unwrap();
        assert_eq!(*h.registry.processes.terminated.borrow(), vec![77]);
        assert!(h.registry.apps().is_empty());

        // No window and no pid: nothing to do.
        h.registry.register_launched_app(app("idle", ""), 0);
        h.registry.close_app("idle").unwrap();
        assert_eq!(ids(h.registry.apps()), vec!["idle"]);
    }

    #[test]
    fn close_with_live_window_requests_close() {
        let mut h = Harness::new();
        let w = h.table.open("Editor", true);
        h.registry.register_window(app("ed", ""), w);
        h.drain();
        h.registry.close_app("ed").unwrap();
        let events = h.drain();
        assert!(events.contains(&ShellEvent::Window { window: w, action: WindowAction::Close }));
        assert!(h.registry.apps().is_empty());
    }

    #[test]
    fn destroyed_window_unregisters_and_stale_handles_are_ignored() {
        let mut h = Harness::new();
        let w = h.table.open("Editor", true);
        h.registry.register_window(app("ed", ""), w);
        h.registry.register_window(app("ed2", ""), w);
        assert_eq!(h.registry.apps().len(), 2);

        h.table.destroy(w);
        h.registry.window_destroyed(w);
        assert!(h.registry.apps().is_empty());

        h.registry.register_window(app("late", ""), w);
        assert!(h.registry.apps().is_empty());
    }

    #[test]
    fn launcher_file_manager_action() {
        let mut h = Harness::new();
        h.registry
            .launch_entry(LaunchAction::FileManager, AppInfo { exec: "ignored".into(), ..AppInfo::default() })
            .unwrap();
        assert_eq!(ids(h.registry.apps()), vec![FILE_MANAGER_ID]);
        assert_eq!(h.drain().last(), Some(&ShellEvent::OpenFileManager));

        // Activating it again opens the file manager rather than launching.
        h.registry.activate_app(FILE_MANAGER_ID).unwrap();
        assert_eq!(h.drain(), vec![ShellEvent::OpenFileManager]);
    }
}
