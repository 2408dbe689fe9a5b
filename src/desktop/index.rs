//! Lookup from normalised class tokens to installed application descriptors.

use super::entry::{desktop_id_from_path, DesktopEntry};
use crate::matcher::normalize_key;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Display metadata of one installed application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopDescriptor {
    /// Normalised descriptor id (file stem).
    pub canonical_id: String,
    pub display_name: String,
    pub icon_name: String,
}

/// Index of installed descriptors keyed by normalised class tokens.
///
/// Several keys may point at the same descriptor: every descriptor is
/// registered under its file id and, if it declares one, its
/// `StartupWMClass`.
#[derive(Debug, Default)]
pub struct DesktopIndex {
    dirs: Vec<PathBuf>,
    by_key: HashMap<String, Arc<DesktopDescriptor>>,
}

impl DesktopIndex {
    /// Create an empty index over `dirs`.  Call [`rebuild`](Self::rebuild)
    /// to populate it.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            by_key: HashMap::new(),
        }
    }

    /// The directories scanned by [`rebuild`](Self::rebuild), in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Rescan every directory and replace the index.
    ///
    /// Directories are visited in order, so a descriptor from a later
    /// directory overwrites an earlier one registered under the same key.
    pub fn rebuild(&mut self) {
        let mut by_key = HashMap::new();

        for path in descriptor_files(&self.dirs) {
            let entry = match DesktopEntry::load(&path) {
                Ok(e) => e,
                Err(e) => {
                    debug!("skipping descriptor: {}", e);
                    continue;
                }
            };
            if entry.no_display {
                continue;
            }
            if entry.name.is_empty() && entry.icon.is_empty() {
                continue;
            }

            let id = desktop_id_from_path(&path);
            let descriptor = Arc::new(DesktopDescriptor {
                canonical_id: id.clone(),
                display_name: entry.name,
                icon_name: entry.icon,
            });

            if !id.is_empty() {
                by_key.insert(id, Arc::clone(&descriptor));
            }
            if !entry.startup_wm_class.is_empty() {
                by_key.insert(normalize_key(&entry.startup_wm_class), descriptor);
            }
        }

        info!("indexed {} descriptor key(s)", by_key.len());
        self.by_key = by_key;
    }

    /// Return the descriptor for the first candidate key that is known.
    pub fn resolve<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&DesktopDescriptor> {
        candidates
            .iter()
            .find_map(|key| self.by_key.get(key.as_ref()))
            .map(|d| d.as_ref())
    }
}

/// The platform's standard application directories, highest priority first:
/// the user data dir followed by every entry of `$XDG_DATA_DIRS`.
pub fn standard_application_dirs() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(data_home) = dirs::data_dir() {
        out.push(data_home.join("applications"));
    }
    let data_dirs = std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".into());
    for dir in data_dirs.split(':').filter(|d| !d.is_empty()) {
        let path = PathBuf::from(dir).join("applications");
        if !out.contains(&path) {
            out.push(path);
        }
    }
    out
}

/// Every `*.desktop` file below `dirs`, recursively, directory order kept.
pub(crate) fn descriptor_files(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in dirs {
        collect_descriptor_files(dir, &mut files);
    }
    files
}

fn collect_descriptor_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(read) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = read.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_descriptor_files(&path, out);
        } else if is_descriptor_file(&path) {
            out.push(path);
        }
    }
}

fn is_descriptor_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("desktop"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::candidate_keys;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn registers_file_id_and_wm_class() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "org.example.Foo.desktop",
            "[Desktop Entry]\nName=FooApp\nIcon=foo-icon\nStartupWMClass=Foo.Bar\n",
        );
        let mut index = DesktopIndex::new(vec![tmp.path().to_path_buf()]);
        index.rebuild();

        let by_id = index.resolve(&["org.example.foo"]).unwrap();
        assert_eq!(by_id.display_name, "FooApp");
        let by_class = index.resolve(&candidate_keys("foo.bar")).unwrap();
        assert_eq!(by_class.canonical_id, "org.example.foo");
        assert_eq!(by_class.icon_name, "foo-icon");
    }

    #[test]
    fn skips_hidden_and_empty_entries() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "hidden.desktop", "[Desktop Entry]\nName=Hidden\nNoDisplay=true\n");
        write(tmp.path(), "blank.desktop", "[Desktop Entry]\nExec=blank\n");
        write(tmp.path(), "notes.txt", "[Desktop Entry]\nName=Notes\n");
        let mut index = DesktopIndex::new(vec![tmp.path().to_path_buf()]);
        index.rebuild();
        assert!(index.is_empty());
    }

    #[test]
    fn scans_subdirectories() {
        let tmp = tempfile::tempdir().unwrap();
        write(&tmp.path().join("kde"), "editor.desktop", "[Desktop Entry]\nName=Editor\n");
        let mut index = DesktopIndex::new(vec![tmp.path().to_path_buf()]);
        index.rebuild();
        assert_eq!(index.resolve(&["editor"]).unwrap().display_name, "Editor");
    }

    #[test]
    fn later_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(first.path(), "term.desktop", "[Desktop Entry]\nName=First\n");
        write(second.path(), "term.desktop", "[Desktop Entry]\nName=Second\n");
        let mut index = DesktopIndex::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        index.rebuild();
        assert_eq!(index.resolve(&["term"]).unwrap().display_name, "Second");
    }

    #[test]
    fn resolve_respects_candidate_order() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "org.desktop", "[Desktop Entry]\nName=Generic\n");
        write(tmp.path(), "editor.desktop", "[Desktop Entry]\nName=Editor\n");
        let mut index = DesktopIndex::new(vec![tmp.path().to_path_buf()]);
        index.rebuild();
        // "org" comes before "editor" among the candidates.
        let hit = index.resolve(&candidate_keys("org.piksel.Editor")).unwrap();
        assert_eq!(hit.display_name, "Generic");
        assert!(index.resolve(&candidate_keys("unknown.thing")).is_none());
    }

    #[test]
    fn missing_directory_is_empty() {
        let mut index = DesktopIndex::new(vec![PathBuf::from("/nonexistent/shelldock")]);
        index.rebuild();
        assert!(index.is_empty());
    }
}
