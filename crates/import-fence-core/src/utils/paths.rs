//! Package path utilities.
//!
//! Package paths are repository-relative, `/` separated, with no leading
//! `./` and no trailing `/`. The repository root is the empty string.

/// Normalizes a user-supplied package path.
///
/// Strips leading `./` and `/` and trailing `/`. `"."` and `"./"` become
/// the repository root `""`.
///
/// # Example
///
/// ```ignore
/// assert_eq!(normalize("./pkg/apis/"), "pkg/apis");
/// assert_eq!(normalize("."), "");
/// ```
#[must_use]
pub fn normalize(path: &str) -> &str {
    let mut p = path.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    let p = p.trim_start_matches('/').trim_end_matches('/');
    if p == "." {
        ""
    } else {
        p
    }
}

/// Checks if `path` falls under `prefix` on a segment boundary.
///
/// The empty prefix matches every path. Otherwise the prefix must equal the
/// path or be followed by `/` in it.
///
/// # Examples
///
/// ```ignore
/// assert!(prefix_matches("a/b", "a/b"));
/// assert!(prefix_matches("a/b/c", "a/b"));
/// assert!(!prefix_matches("a/bc", "a/b"));
/// assert!(prefix_matches("anything", ""));
/// ```
#[must_use]
pub fn prefix_matches(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Returns the parent directory of a package path.
///
/// `None` for the repository root.
#[must_use]
pub fn parent(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rsplit_once('/').map_or("", |(head, _)| head))
}

/// Iterates over `path` and all of its ancestors, nearest first, ending with
/// the repository root `""`.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(path), |&p| parent(p))
}

/// Formats a directory for humans: the repository root shows as `.`.
#[must_use]
pub fn display_dir(dir: &str) -> &str {
    if dir.is_empty() {
        "."
    } else {
        dir
    }
}

/// Converts a filesystem path relative to the repository root into a
/// package path.
#[must_use]
pub fn from_relative(path: &std::path::Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
