//! Parser for the key/value application descriptor format (`*.desktop`).
//!
//! Only the `[Desktop Entry]` group is read, and only the handful of keys the
//! shell cares about.  Localised variants such as `Name[de]` are skipped.

use std::path::Path;

const DESKTOP_ENTRY_GROUP: &str = "Desktop Entry";

/// The recognised keys of one descriptor file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopEntry {
    pub name: String,
    pub icon: String,
    pub startup_wm_class: String,
    pub exec: String,
    pub kind: String,
    pub no_display: bool,
    pub hidden: bool,
    pub terminal: bool,
}

/// Error from reading a descriptor file.
#[derive(Debug, thiserror::Error)]
#[error("failed to read {path}: {source}")]
pub struct EntryError {
    path: String,
    #[source]
    source: std::io::Error,
}

impl DesktopEntry {
    /// Read and parse the descriptor at `path`.
    pub fn load(path: &Path) -> Result<Self, EntryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| EntryError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }

    /// Parse descriptor text.  Unknown keys and malformed lines are ignored.
    pub fn parse(contents: &str) -> Self {
        let mut entry = Self::default();
        let mut in_group = false;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(group) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_group = group.trim() == DESKTOP_ENTRY_GROUP;
                continue;
            }
            if !in_group {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Name" => entry.name = value.to_string(),
                "Icon" => entry.icon = value.to_string(),
                "StartupWMClass" => entry.startup_wm_class = value.to_string(),
                "Exec" => entry.exec = value.to_string(),
                "Type" => entry.kind = value.to_string(),
                "NoDisplay" => entry.no_display = parse_bool(value),
                "Hidden" => entry.hidden = parse_bool(value),
                "Terminal" => entry.terminal = parse_bool(value),
                _ => {}
            }
        }
        entry
    }

    /// Whether the entry describes a launchable application (a missing
    /// `Type` is treated as one).
    pub fn is_application(&self) -> bool {
        self.kind.is_empty() || self.kind.eq_ignore_ascii_case("Application")
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Normalised descriptor id derived from a file path: the file name with a
/// trailing `.desktop` removed, trimmed and lowercased.
pub fn desktop_id_from_path(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match file.len().checked_sub(".desktop".len()) {
        Some(cut) if file.is_char_boundary(cut) && file[cut..].eq_ignore_ascii_case(".desktop") => {
            &file[..cut]
        }
        _ => file.as_str(),
    };
    crate::matcher::normalize_key(stem)
}
