//! Wire format of the persisted pinned list (`dock/pinnedApps`).
//!
//! ```json
//! [{"appId":"org.example.editor","text":"Editor","iconSource":"","iconName":"editor","exec":"editor"}]
//! ```

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// One pinned dock entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PinnedEntry {
    pub app_id: String,
    pub text: String,
    pub icon_source: String,
    pub icon_name: String,
    pub exec: String,
}

/// Parse a pinned list.
///
/// Returns `None` when `raw` is not a JSON array.  Inside the array,
/// elements that are not objects or lack a non-empty `appId` are skipped,
/// and for repeated ids the first occurrence wins.
pub fn parse_pinned(raw: &str) -> Option<Vec<PinnedEntry>> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("pinned list is not valid JSON: {}", e);
            return None;
        }
    };
    let Value::Array(items) = value else {
        warn!("pinned list is not a JSON array");
        return None;
    };

    let mut seen = HashSet::new();
    let entries = items
        .iter()
        .filter_map(Value::as_object)
        .map(entry_from_object)
        .filter(|e| !e.app_id.is_empty() && seen.insert(e.app_id.clone()))
        .collect();
    Some(entries)
}

/// Fields that are missing, `null` or not strings read as empty.
fn entry_from_object(o: &Map<String, Value>) -> PinnedEntry {
    let field = |key: &str| o.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
    PinnedEntry {
        app_id: field("appId").trim().to_string(),
        text: field("text"),
        icon_source: field("iconSource"),
        icon_name: field("iconName"),
        exec: field("exec"),
    }
}

/// Serialise a pinned list in the order given.
pub fn serialize_pinned(entries: &[PinnedEntry]) -> String {
    serde_json::to_string(entries).unwrap_or_else(|_| "[]".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_in_order() {
        let raw = r#"[
            {"appId":"b","text":"B","iconSource":"","iconName":"b","exec":"b"},
            {"appId":"a","text":"A"}
        ]"#;
        let entries = parse_pinned(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].app_id, "b");
        assert_eq!(entries[0].exec, "b");
        assert_eq!(entries[1].app_id, "a");
        assert_eq!(entries[1].icon_name, "");
    }

    #[test]
    fn skips_invalid_elements_and_keeps_first_duplicate() {
        let raw = r#"[1, "x", {"text":"no id"}, {"appId":"  "},
                      {"appId":"a","text":"first"}, {"appId":"a","text":"second"}]"#;
        let entries = parse_pinned(raw).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "first");
    }

    #[test]
    fn mistyped_fields_read_as_empty() {
        let raw = r#"[{"appId":"a","text":"A","iconSource":null,"exec":"a"},
                      {"appId":"b","text":7,"iconName":["x"]}]"#;
        let entries = parse_pinned(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].icon_source, "");
        assert_eq!(entries[0].exec, "a");
        assert_eq!(entries[1].app_id, "b");
        assert_eq!(entries[1].text, "");
        assert_eq!(entries[1].icon_name, "");
        assert!(parse_pinned(r#"[{"appId":5}]"#).unwrap().is_empty());
    }

    #[test]
    fn non_array_is_rejected() {
        assert!(parse_pinned("{").is_none());
        assert!(parse_pinned(r#"{"appId":"a"}"#).is_none());
        assert_eq!(parse_pinned("[]"), Some(vec![]));
    }

    #[test]
    fn serializes_camel_case() {
        let e = PinnedEntry {
            app_id: "a".into(),
            text: "A".into(),
            ..PinnedEntry::default()
        };
        let json = serialize_pinned(&[e.clone()]);
        assert_eq!(json, r#"[{"appId":"a","text":"A","iconSource":"","iconName":"","exec":""}]"#);
        assert_eq!(parse_pinned(&json), Some(vec![e]));
    }
}
