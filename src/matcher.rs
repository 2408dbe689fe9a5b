//! Window-class identity matching.
//!
//! Application identifiers vary across packaging conventions: X11 windows
//! report `instance.Class` pairs, Wayland clients report reverse-DNS app ids
//! (`org.gnome.Nautilus`), and descriptor files are named either way.  The
//! matcher turns one raw class token into an ordered list of lookup keys,
//! most specific first, so the [`DesktopIndex`](crate::desktop::DesktopIndex)
//! can try them in turn.

/// Normalise a key for lookups: trimmed and lowercased.
pub fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Produce the ordered, duplicate-free lookup keys for a raw class token.
///
/// The full token always comes first.  When the token contains a `.` that
/// is not at either end, the segments around the first dot and then around
/// the last dot follow, in that order.
///
/// ```
/// use shelldock::matcher::candidate_keys;
///
/// assert_eq!(
///     candidate_keys("org.piksel.Editor"),
///     vec!["org.piksel.editor", "org", "piksel.editor", "org.piksel", "editor"],
/// );
/// assert_eq!(candidate_keys("simple"), vec!["simple"]);
/// ```
pub fn candidate_keys(raw: &str) -> Vec<String> {
    let token = raw.trim();
    if token.is_empty() {
        return Vec::new();
    }

    let mut parts: Vec<&str> = vec![token];
    if let Some(dot) = interior_dot(token, token.find('.')) {
        parts.push(&token[..dot]);
        parts.push(&token[dot + 1..]);
    }
    if let Some(dot) = interior_dot(token, token.rfind('.')) {
        parts.push(&token[..dot]);
        parts.push(&token[dot + 1..]);
    }

    let mut out: Vec<String> = Vec::with_capacity(parts.len());
    for part in parts {
        let key = normalize_key(part);
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

/// Keep a dot position only if it splits the token into two non-empty halves.
fn interior_dot(token: &str, pos: Option<usize>) -> Option<usize> {
    pos.filter(|&dot| dot > 0 && dot + 1 < token.len())
}
