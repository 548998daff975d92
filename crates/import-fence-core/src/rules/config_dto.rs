//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use serde::Deserialize;
use toml::Spanned;

/// Raw TOML representation of one rule declaration file.
///
/// ```toml
/// allowed = ["pkg/apis", "pkg/util"]
/// forbidden = ["third_party"]
/// inherit_from_ancestors = false
/// ```
///
/// Prefix entries keep their byte span so validation errors can point at
/// the offending line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFileDto {
    /// Allowed import prefixes, in declaration order.
    #[serde(default)]
    pub allowed: Vec<Spanned<String>>,

    /// Forbidden import prefixes, in declaration order.
    #[serde(default)]
    pub forbidden: Vec<Spanned<String>>,

    /// Extend the nearest ancestor rule instead of replacing it.
    #[serde(default, alias = "inheritFromAncestors")]
    pub inherit_from_ancestors: bool,
}
