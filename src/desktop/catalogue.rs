//! The launcher's catalogue of installed applications.

use super::entry::{desktop_id_from_path, DesktopEntry};
use super::index::descriptor_files;
use crate::launch::{LaunchAction, FILE_MANAGER_ICON, FILE_MANAGER_ID};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NON_ID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9._-]+").expect("valid regex"));

/// One launchable row of the launcher grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LauncherApp {
    pub app_id: String,
    pub name: String,
    pub action: LaunchAction,
    pub exec: String,
    pub icon_source: String,
    pub icon_name: String,
}

impl LauncherApp {
    fn has_icon(&self) -> bool {
        !self.icon_source.is_empty() || !self.icon_name.is_empty()
    }
}

/// The built-in file manager row that heads every catalogue.
pub fn file_manager_entry() -> LauncherApp {
    LauncherApp {
        app_id: FILE_MANAGER_ID.into(),
        name: "File Manager".into(),
        action: LaunchAction::FileManager,
        exec: String::new(),
        icon_source: FILE_MANAGER_ICON.into(),
        icon_name: String::new(),
    }
}

/// Turn an arbitrary label into an id: lowercase, runs of characters other
/// than `[a-z0-9._-]` replaced by `-`, `"app"` when nothing is left.
pub fn normalize_id(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let out = NON_ID_CHARS.replace_all(&lowered, "-").trim().to_string();
    if out.is_empty() {
        "app".into()
    } else {
        out
    }
}

/// Best-effort id from an exec line: the file name of its first token.
pub fn exec_program_key(exec: &str) -> String {
    let Some(first) = exec.split_whitespace().next() else {
        return String::new();
    };
    let prog = first
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(first);
    let file = Path::new(prog)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    if file.is_empty() {
        return String::new();
    }
    normalize_id(&file)
}

/// Split a descriptor `Icon` value into `(icon_source, icon_name)`: values
/// that look like paths become a `file://` source, the rest a theme name.
pub fn icon_fields(icon: &str) -> (String, String) {
    if icon.is_empty() {
        (String::new(), String::new())
    } else if icon.contains('/') || icon.contains('.') || Path::new(icon).exists() {
        (format!("file://{}", icon), String::new())
    } else {
        (String::new(), icon.to_string())
    }
}

/// Scan `dirs` for launchable applications.
///
/// Entries that are hidden, terminal-only, not of type `Application`, or
/// lack a name or exec line are dropped.  When two files map to the same
/// id, the one with an icon (or failing that, the longer name) wins.  The
/// result is sorted by name and starts with [`file_manager_entry`].
pub fn scan_launcher_apps(dirs: &[PathBuf]) -> Vec<LauncherApp> {
    let mut best: HashMap<String, LauncherApp> = HashMap::new();

    for path in descriptor_files(dirs) {
        let Ok(entry) = DesktopEntry::load(&path) else {
            continue;
        };
        if !entry.is_application() || entry.hidden || entry.no_display || entry.terminal {
            continue;
        }
        if entry.name.is_empty() || entry.exec.is_empty() {
            continue;
        }

        let mut app_id = desktop_id_from_path(&path);
        if app_id.is_empty() {
            app_id = exec_program_key(&entry.exec);
        }
        if app_id.is_empty() {
            app_id = normalize_id(&entry.name);
        }
        let (icon_source, icon_name) = icon_fields(&entry.icon);
        let row = LauncherApp {
            app_id,
            name: entry.name,
            action: LaunchAction::Exec,
            exec: entry.exec,
            icon_source,
            icon_name,
        };

        match best.get(&row.app_id) {
            Some(current) => {
                let prefer = (!current.has_icon() && row.has_icon()) || current.name.len() < row.name.len();
                if prefer {
                    best.insert(row.app_id.clone(), row);
                }
            }
            None => {
                best.insert(row.app_id.clone(), row);
            }
        }
    }

    let mut rows: Vec<LauncherApp> = best.into_values().collect();
    rows.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.app_id.cmp(&b.app_id))
    });

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(file_manager_entry());
    out.extend(rows);
    out
}
