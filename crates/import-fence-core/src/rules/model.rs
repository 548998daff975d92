//! Pure domain model for directory import rules.
//!
//! This module contains no serde, no I/O dependencies.
//! All invariants are enforced at construction time via validated newtypes.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::utils::paths;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated import path prefix.
///
/// The empty prefix matches every import path. Any other prefix must be a
/// `/` separated path without leading or trailing `/`, empty segments, or
/// `.`/`..` segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prefix(String);

impl Prefix {
    /// Creates a new prefix.
    ///
    /// # Errors
    ///
    /// Returns error if the prefix is not a well-formed path.
    pub fn new(prefix: &str) -> Result<Self, ModelError> {
        if prefix.is_empty() {
            return Ok(Self::everything());
        }
        if prefix.starts_with('/') {
            return Err(ModelError::LeadingSlash {
                prefix: prefix.to_string(),
            });
        }
        if prefix.ends_with('/') {
            return Err(ModelError::TrailingSlash {
                prefix: prefix.to_string(),
            });
        }
        if prefix
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(ModelError::InvalidSegment {
                prefix: prefix.to_string(),
            });
        }
        Ok(Self(prefix.to_string()))
    }

    /// The prefix that matches every import path.
    #[must_use]
    pub fn everything() -> Self {
        Self(String::new())
    }

    /// Returns true if this is the match-everything prefix.
    #[must_use]
    pub fn is_everything(&self) -> bool {
        self.0.is_empty()
    }

    /// Tests whether an import path falls under this prefix.
    #[must_use]
    pub fn matches(&self, import_path: &str) -> bool {
        paths::prefix_matches(import_path, &self.0)
    }

    /// Returns the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

// ────────────────────────────────────────────
// Domain entities
// ────────────────────────────────────────────

/// The allow/forbid rule declared for one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    directory: String,
    allowed: Vec<Prefix>,
    forbidden: Vec<Prefix>,
    inherit_from_ancestors: bool,
    source: Option<PathBuf>,
}

impl Rule {
    /// Creates a new rule for `directory`.
    ///
    /// A prefix may appear in both lists; the forbidden entry wins when the
    /// rule is applied.
    #[must_use]
    pub fn new(
        directory: &str,
        allowed: Vec<Prefix>,
        forbidden: Vec<Prefix>,
        inherit_from_ancestors: bool,
    ) -> Self {
        Self {
            directory: paths::normalize(directory).to_string(),
            allowed,
            forbidden,
            inherit_from_ancestors,
            source: None,
        }
    }

    /// Records the file this rule was loaded from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the directory this rule belongs to.
    #[must_use]
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Returns the allowed prefixes in declaration order.
    #[must_use]
    pub fn allowed(&self) -> &[Prefix] {
        &self.allowed
    }

    /// Returns the forbidden prefixes in declaration order.
    #[must_use]
    pub fn forbidden(&self) -> &[Prefix] {
        &self.forbidden
    }

    /// Returns true if the rule extends its ancestors instead of replacing them.
    #[must_use]
    pub fn inherits_from_ancestors(&self) -> bool {
        self.inherit_from_ancestors
    }

    /// Returns the declaration file, if the rule was loaded from disk.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Errors in domain model construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Prefix starts with `/`.
    #[error("invalid prefix `{prefix}`: must not start with `/`")]
    LeadingSlash {
        /// The invalid prefix.
        prefix: String,
    },

    /// Prefix ends with `/`.
    #[error("invalid prefix `{prefix}`: must not end with `/`")]
    TrailingSlash {
        /// The invalid prefix.
        prefix: String,
    },

    /// Prefix contains an empty, `.` or `..` segment.
    #[error("invalid prefix `{prefix}`: empty, `.` and `..` segments are not allowed")]
    InvalidSegment {
        /// The invalid prefix.
        prefix: String,
    },
}

// ────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(raw: &[&str]) -> Vec<Prefix> {
        raw.iter().map(|p| Prefix::new(p).unwrap()).collect()
    }

    // -- Prefix --

    #[test]
    fn prefix_valid() {
        assert!(Prefix::new("pkg/apis").is_ok());
        assert!(Prefix::new("k8s.io/api").is_ok());
        assert!(Prefix::new("third_party").is_ok());
    }

    #[test]
    fn empty_prefix_matches_everything() {
        let pat = Prefix::new("").unwrap();
        assert!(pat.is_everything());
        assert!(pat.matches("pkg/apis"));
        assert!(pat.matches("fmt"));
    }

    #[test]
    fn prefix_rejects_malformed_paths() {
        assert!(matches!(
            Prefix::new("/pkg"),
            Err(ModelError::LeadingSlash { .. })
        ));
        assert!(matches!(
            Prefix::new("pkg/"),
            Err(ModelError::TrailingSlash { .. })
        ));
        assert!(matches!(
            Prefix::new("pkg//apis"),
            Err(ModelError::InvalidSegment { .. })
        ));
        assert!(matches!(
            Prefix::new("pkg/../secret"),
            Err(ModelError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn prefix_matches_on_segment_boundary() {
        let pat = Prefix::new("pkg/apis").unwrap();
        assert!(pat.matches("pkg/apis"));
        assert!(pat.matches("pkg/apis/bar"));
        assert!(!pat.matches("pkg/apiserver"));
        assert!(!pat.matches("pkg"));
    }

    #[test]
    fn prefix_display_is_quoted() {
        assert_eq!(Prefix::new("third_party").unwrap().to_string(), "\"third_party\"");
        assert_eq!(Prefix::everything().to_string(), "\"\"");
    }

    // -- Rule --

    #[test]
    fn rule_keeps_declaration_order() {
        let rule = Rule::new(
            "pkg/apis/foo",
            prefixes(&["pkg/apis", "pkg/util"]),
            prefixes(&["pkg/util/exec"]),
            false,
        );
        assert_eq!(rule.directory(), "pkg/apis/foo");
        assert_eq!(rule.allowed()[0].as_str(), "pkg/apis");
        assert_eq!(rule.allowed()[1].as_str(), "pkg/util");
        assert!(!rule.inherits_from_ancestors());
        assert!(rule.source().is_none());
    }

    #[test]
    fn rule_keeps_prefix_listed_in_both() {
        let rule = Rule::new(
            "extensions",
            prefixes(&["", "third_party"]),
            prefixes(&["third_party"]),
            false,
        );
        assert_eq!(rule.allowed()[1], rule.forbidden()[0]);
    }

    #[test]
    fn rule_normalizes_directory() {
        let rule = Rule::new("./extensions/", vec![], vec![], true);
        assert_eq!(rule.directory(), "extensions");
        assert!(rule.inherits_from_ancestors());
    }
}
