//! Core types for boundary violations and check results.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::graph::ImportLookupError;
use crate::utils::paths;

/// Why an import edge was rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MatchReason {
    /// The imported path matched a forbidden prefix.
    Forbidden {
        /// The matching prefix.
        prefix: String,
        /// Directory whose rule declared the prefix.
        #[serde(rename = "declaredIn")]
        declared_in: String,
    },
    /// The imported path matched none of the allowed prefixes.
    NoAllowedPrefix,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forbidden {
                prefix,
                declared_in,
            } => write!(
                f,
                "forbidden by prefix {prefix:?} (declared in {})",
                paths::display_dir(declared_in)
            ),
            Self::NoAllowedPrefix => write!(f, "no allowed prefix matched"),
        }
    }
}

/// An import edge the importer's effective rules do not permit.
///
/// Ordered by importer, then imported.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// The importing package.
    pub importer: String,
    /// The imported package.
    pub imported: String,
    /// Why the edge was rejected.
    pub matched_rule: MatchReason,
    /// Rule directories consulted for the importer, nearest first.
    pub resolution_chain: Vec<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imports {}: {}",
            paths::display_dir(&self.importer),
            self.imported,
            self.matched_rule
        )
    }
}

/// Process exit status of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExitStatus {
    /// Every root was checked and no violation was found.
    Clean = 0,
    /// At least one violation was found.
    Violations = 1,
    /// Configuration or inspection error.
    Error = 2,
}

impl ExitStatus {
    /// Returns the numeric process exit code.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Outcome of checking one root package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum RootStatus {
    /// The import graph was expanded and evaluated.
    Checked {
        /// Packages in the root's import graph.
        #[serde(rename = "packagesVisited")]
        packages_visited: usize,
        /// Violations found, sorted.
        violations: Vec<Violation>,
    },
    /// The import graph could not be expanded.
    InspectionFailed {
        /// What the lister reported.
        #[serde(serialize_with = "serialize_display")]
        error: ImportLookupError,
    },
    /// The run was cancelled before this root finished.
    Cancelled,
}

fn serialize_display<S: Serializer>(value: &ImportLookupError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

/// A root package together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootReport {
    /// The root package.
    pub root: String,
    /// Its outcome.
    #[serde(flatten)]
    pub status: RootStatus,
}

impl RootReport {
    /// Returns true if the root was checked and no violation was found.
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(&self.status, RootStatus::Checked { violations, .. } if violations.is_empty())
    }
}

/// Result of checking a set of root packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Per-root outcomes in target order.
    pub roots: Vec<RootReport>,
}

impl CheckReport {
    /// Creates a report from per-root outcomes.
    #[must_use]
    pub fn new(roots: Vec<RootReport>) -> Self {
        Self { roots }
    }

    /// Returns the violations of every checked root, deduplicated and sorted.
    #[must_use]
    pub fn violations(&self) -> Vec<&Violation> {
        self.roots
            .iter()
            .filter_map(|r| match &r.status {
                RootStatus::Checked { violations, .. } => Some(violations),
                _ => None,
            })
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns the roots whose import graph could not be expanded.
    #[must_use]
    pub fn failures(&self) -> Vec<(&str, &ImportLookupError)> {
        self.roots
            .iter()
            .filter_map(|r| match &r.status {
                RootStatus::InspectionFailed { error } => Some((r.root.as_str(), error)),
                _ => None,
            })
            .collect()
    }

    /// Returns the roots that were cancelled.
    #[must_use]
    pub fn cancelled(&self) -> Vec<&str> {
        self.roots
            .iter()
            .filter(|r| r.status == RootStatus::Cancelled)
            .map(|r| r.root.as_str())
            .collect()
    }

    /// Returns the total number of packages visited over all roots.
    #[must_use]
    pub fn packages_visited(&self) -> usize {
        self.roots
            .iter()
            .map(|r| match r.status {
                RootStatus::Checked {
                    packages_visited, ..
                } => packages_visited,
                _ => 0,
            })
            .sum()
    }

    /// Returns the exit status for this report.
    ///
    /// Any failed or cancelled root makes the run an error, even if other
    /// roots found violations.
    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        if self
            .roots
            .iter()
            .any(|r| !matches!(r.status, RootStatus::Checked { .. }))
        {
            ExitStatus::Error
        } else if self.roots.iter().all(RootReport::passed) {
            ExitStatus::Clean
        } else {
            ExitStatus::Violations
        }
    }
}
