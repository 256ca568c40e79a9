//! Dot-joined paths and prefix patterns.
//!
//! A path names a location reached through object keys only, e.g.
//! `info.weather`. List indices never appear in a path.
//!
//! Patterns match by raw string prefix, not by path segment: the pattern
//! `info` matches `info.weather` and also `information.x`.

/// Append `key` to `parent`, or return `key` alone at the root.
///
/// # Examples
///
/// ```
/// use carryover_types::join_path;
///
/// assert_eq!(join_path("", "info"), "info");
/// assert_eq!(join_path("info", "weather"), "info.weather");
/// ```
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Returns `true` if `path` starts with `pattern`.
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    path.starts_with(pattern)
}
