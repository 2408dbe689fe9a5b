//! The poll-driven running-apps snapshot.
//!
//! Every tick combines the local window table with the external helper's
//! listing, resolves each external window to an installed application, and
//! reduces the result to one row per application.  A
//! [`ShellEvent::RunningApps`] is sent only when the rows differ from the
//! last ones sent.

use super::wmctrl::parse_window_list;
use crate::config::{RunningAppsConfig, TitleOverride};
use crate::desktop::DesktopIndex;
use crate::matcher::{candidate_keys, normalize_key};
use crate::traits::{LocalWindows, ShellEvent, WindowLister};
use crate::windows::arena::WindowId;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::mpsc;

/// What a row activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationKey {
    /// A window in the local table.
    Local(WindowId),
    /// A native window id reported by the helper.
    External(u64),
}

/// Where a window was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    External,
}

/// One discovered window, before identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub title: String,
    pub window_class: String,
    pub handle: ActivationKey,
    pub origin: Origin,
}

/// One row of the running-apps view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRow {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    pub activation: ActivationKey,
}

/// Builds and tracks the running-apps snapshot.
///
/// Generic over the local window source and the external helper so tests
/// can substitute both.  `lister` is `None` when no helper is installed.
pub struct RunningApps<L: LocalWindows, X: WindowLister> {
    local: L,
    lister: Option<X>,
    index: DesktopIndex,
    config: RunningAppsConfig,
    rows: Vec<SnapshotRow>,
    events: Option<mpsc::Sender<ShellEvent>>,
}

impl<L: LocalWindows, X: WindowLister> RunningApps<L, X> {
    pub fn new(local: L, lister: Option<X>, index: DesktopIndex, config: RunningAppsConfig) -> Self {
        Self {
            local,
            lister,
            index,
            config,
            rows: Vec::new(),
            events: None,
        }
    }

    /// Attach the channel that receives [`ShellEvent::RunningApps`].
    pub fn set_events(&mut self, tx: mpsc::Sender<ShellEvent>) {
        self.events = Some(tx);
    }

    /// The rows sent by the last notifying refresh.
    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn index(&self) -> &DesktopIndex {
        &self.index
    }

    /// Rescan installed descriptors.
    pub fn rebuild_index(&mut self) {
        self.index.rebuild();
    }

    /// Run one poll.  Returns `true` if the snapshot changed and a
    /// notification was sent.
    pub fn refresh(&mut self) -> bool {
        let next = self.build();
        if next == self.rows {
            return false;
        }
        debug!("running apps changed: {} row(s)", next.len());
        self.rows = next;
        if let Some(tx) = &self.events {
            let _ = tx.send(ShellEvent::RunningApps {
                rows: self.rows.clone(),
            });
        }
        true
    }

    /// Collect every window from both sources, local windows first.
    ///
    /// Helper failures are logged and yield only the local windows.
    pub fn enumerate(&self) -> Vec<WindowRecord> {
        let mut records: Vec<WindowRecord> = self
            .local
            .local_windows()
            .into_iter()
            .filter(|w| w.visible && !w.title.trim().is_empty())
            .map(|w| WindowRecord {
                title: w.title.trim().to_string(),
                window_class: String::new(),
                handle: ActivationKey::Local(w.id),
                origin: Origin::Local,
            })
            .collect();

        let Some(lister) = &self.lister else {
            return records;
        };
        match lister.list_windows() {
            Ok(out) => {
                let panel_class = self.config.panel_class.to_lowercase();
                records.extend(
                    parse_window_list(&out)
                        .into_iter()
                        .filter(|w| panel_class.is_empty() || !w.wm_class.to_lowercase().contains(&panel_class))
                        .map(|w| WindowRecord {
                            title: w.title,
                            window_class: w.wm_class,
                            handle: ActivationKey::External(w.id),
                            origin: Origin::External,
                        }),
                );
            }
            Err(e) => debug!("window helper gave no result this tick: {}", e),
        }
        records
    }

    /// Build the deduplicated rows for the current windows without
    /// notifying.
    pub fn build(&self) -> Vec<SnapshotRow> {
        let mut rows = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for record in self.enumerate() {
            let (key, row) = match record.origin {
                Origin::Local => self.local_row(record),
                Origin::External => self.external_row(record),
            };
            if seen.insert(key) {
                rows.push(row);
            }
        }
        rows
    }

    fn local_row(&self, record: WindowRecord) -> (String, SnapshotRow) {
        let matched = self.find_override(|o| o.matches_title(&record.title));
        let key = matched
            .map(|o| o.key.clone())
            .unwrap_or_else(|| normalize_key(&record.title));
        let row = SnapshotRow {
            text: record.title,
            icon_source: matched.map(|o| o.icon_source.clone()),
            icon_name: None,
            activation: record.handle,
        };
        (key, row)
    }

    fn external_row(&self, record: WindowRecord) -> (String, SnapshotRow) {
        let candidates = candidate_keys(&record.window_class);
        let descriptor = self.index.resolve(&candidates);

        let text = descriptor
            .map(|d| d.display_name.clone())
            .filter(|n| !n.is_empty())
            .or_else(|| Some(record.title.clone()).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| record.window_class.clone());
        let icon_name = descriptor
            .map(|d| d.icon_name.clone())
            .filter(|i| !i.is_empty())
            .or_else(|| candidates.first().cloned())
            .unwrap_or_default();
        let icon_source = self
            .find_override(|o| o.matches_external(&text, &record.window_class))
            .map(|o| o.icon_source.clone());

        let key = candidates.first().cloned().unwrap_or_else(|| {
            normalize_key(if icon_name.is_empty() { &text } else { &icon_name })
        });
        let row = SnapshotRow {
            text,
            icon_source,
            icon_name: Some(icon_name).filter(|i| !i.is_empty()),
            activation: record.handle,
        };
        (key, row)
    }

    fn find_override(&self, pred: impl Fn(&TitleOverride) -> bool) -> Option<&TitleOverride> {
        self.config.overrides.iter().find(|o| pred(o))
    }

    /// Bring the window behind `key` to the front.
    ///
    /// Failures (stale handle, helper missing) are logged, never returned.
    pub fn activate(&self, key: ActivationKey) {
        match key {
            ActivationKey::Local(id) => {
                if !self.local.is_alive(id) {
                    debug!("activate: local window {:?} is gone", id);
                    return;
                }
                let result = self
                    .local
                    .is_visible(id)
                    .and_then(|visible| if visible { Ok(()) } else { self.local.show(id) })
                    .and_then(|_| self.local.raise(id))
                    .and_then(|_| self.local.focus(id));
                if let Err(e) = result {
                    warn!("activate local window {:?}: {}", id, e);
                }
            }
            ActivationKey::External(id) => match &self.lister {
                Some(lister) => {
                    if let Err(e) = lister.activate(id) {
                        warn!("activate external window 0x{:x}: {}", id, e);
                    }
                }
                None => debug!("activate: no window helper for 0x{:x}", id),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::arena::{WindowAction, WindowTable};
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    //  Fake helper

    #[derive(Debug, thiserror::Error)]
    #[error("fake helper failure")]
    struct FakeError;

    #[derive(Default)]
    struct FakeLister {
        output: RefCell<Option<String>>,
        activated: RefCell<Vec<u64>>,
    }

    impl FakeLister {
        fn with(output: &str) -> Self {
            Self {
                output: RefCell::new(Some(output.to_string())),
                ..Self::default()
            }
        }
    }

    impl WindowLister for FakeLister {
        type Error = FakeError;

        fn list_windows(&self) -> Result<String, FakeError> {
            self.output.borrow().clone().ok_or(FakeError)
        }

        fn activate(&self, window_id: u64) -> Result<(), FakeError> {
            self.activated.borrow_mut().push(window_id);
            Ok(())
        }
    }

    fn index_with(files: &[(&str, &str)]) -> (tempfile::TempDir, DesktopIndex) {
        let tmp = tempfile::tempdir().unwrap();
        for (name, body) in files {
            fs::write(tmp.path().join(name), body).unwrap();
        }
        let mut index = DesktopIndex::new(vec![tmp.path().to_path_buf()]);
        index.rebuild();
        (tmp, index)
    }

    fn empty_index() -> DesktopIndex {
        DesktopIndex::new(vec![Path::new("/nonexistent").to_path_buf()])
    }

    fn apps(table: &WindowTable, lister: Option<FakeLister>, index: DesktopIndex) -> RunningApps<WindowTable, FakeLister> {
        RunningApps::new(table.clone(), lister, index, RunningAppsConfig::default())
    }

    #[test]
    fn descriptor_name_beats_window_title() {
        let (_tmp, index) = index_with(&[
            ("foo.desktop", "[Desktop Entry]\nName=FooApp\nIcon=foo\nStartupWMClass=Foo.Bar\n"),
            ("other.desktop", "[Desktop Entry]\nName=Other\nStartupWMClass=Foo.Bar.Other\n"),
        ]);
        let table = WindowTable::new();
        let running = apps(&table, Some(FakeLister::with("0x10 0 host foo.bar Untitled\n")), index);

        let rows = running.build();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "FooApp");
        assert_eq!(rows[0].icon_name.as_deref(), Some("foo"));
        assert_eq!(rows[0].activation, ActivationKey::External(0x10));
    }

    #[test]
    fn unresolved_window_falls_back_to_title_and_first_candidate() {
        let table = WindowTable::new();
        let running = apps(&table, Some(FakeLister::with("0x20 0 h org.example.Tool  My Tool\n")), empty_index());
        let rows = running.build();
        assert_eq!(rows[0].text, "My Tool");
        assert_eq!(rows[0].icon_name.as_deref(), Some("org.example.tool"));
    }

    #[test]
    fn identical_polls_notify_once() {
        let table = WindowTable::new();
        table.open("Editor", true);
        let mut running = apps(&table, Some(FakeLister::with("0x30 0 h term.Term shell\n")), empty_index());
        let (tx, rx) = mpsc::channel();
        running.set_events(tx);

        assert!(running.refresh());
        assert!(!running.refresh());
        let events: Vec<ShellEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ShellEvent::RunningApps { rows } if rows.len() == 2));
    }

    #[test]
    fn change_in_windows_notifies_again() {
        let table = WindowTable::new();
        let w = table.open("Editor", true);
        let mut running = apps(&table, None, empty_index());
        assert!(running.refresh());
        table.update(w, "Editor", false).unwrap();
        assert!(running.refresh());
        assert!(running.rows().is_empty());
    }

    #[test]
    fn local_window_wins_dedup_over_external() {
        let table = WindowTable::new();
        let w = table.open("Editor", true);
        let running = apps(&table, Some(FakeLister::with("0x40 0 h Editor  Editor window\n")), empty_index());
        let rows = running.build();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activation, ActivationKey::Local(w));
    }

    #[test]
    fn title_override_assigns_icon_and_stable_key() {
        let table = WindowTable::new();
        table.open("File Manager - Home", true);
        table.open("File Manager - Downloads", true);
        table.open("Settings", true);
        let running = apps(&table, Some(FakeLister::with("0x50 0 h filemanager.X  files\n")), empty_index());
        let rows = running.build();
        // Both file-manager windows share one key, and the external window
        // whose first candidate is a different key still shows.
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].icon_source.as_deref(), Some("builtin:folder"));
        assert_eq!(rows[1].icon_source.as_deref(), Some("builtin:settings"));
    }

    #[test]
    fn hidden_and_untitled_local_windows_are_skipped() {
        let table = WindowTable::new();
        table.open("Hidden", false);
        table.open("   ", true);
        let running = apps(&table, None, empty_index());
        assert!(running.build().is_empty());
    }

    #[test]
    fn panel_windows_are_excluded() {
        let table = WindowTable::new();
        let running = apps(
            &table,
            Some(FakeLister::with("0x60 0 h shelldock-panel.Shelldock-panel panel\n0x61 0 h a.B app\n")),
            empty_index(),
        );
        let rows = running.build();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activation, ActivationKey::External(0x61));
    }

    #[test]
    fn helper_failure_keeps_local_rows() {
        let table = WindowTable::new();
        table.open("Editor", true);
        let mut running = apps(&table, Some(FakeLister::default()), empty_index());
        assert!(running.refresh());
        assert_eq!(running.rows().len(), 1);
        assert_eq!(running.rows()[0].text, "Editor");
    }

    #[test]
    fn activation_routes_by_origin() {
        let (tx, rx) = mpsc::channel();
        let table = WindowTable::with_requests(tx);
        let w = table.open("Editor", false);
        let running = apps(&table, Some(FakeLister::with("")), empty_index());

        running.activate(ActivationKey::Local(w));
        let actions: Vec<WindowAction> = rx
            .try_iter()
            .filter_map(|e| match e {
                ShellEvent::Window { action, .. } => Some(action),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec![WindowAction::Show, WindowAction::Raise, WindowAction::Focus]);

        running.activate(ActivationKey::External(0xabc));
        assert_eq!(*running.lister.as_ref().unwrap().activated.borrow(), vec![0xabc]);
    }
}
