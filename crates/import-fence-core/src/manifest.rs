//! An import lister backed by a precomputed manifest.
//!
//! The manifest is a JSON object mapping each package to its direct imports:
//!
//! ```json
//! {
//!   "cmd/app": ["pkg/a", "fmt"],
//!   "pkg/a": [],
//!   "fmt": []
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::graph::{ImportLister, ImportLookupError};
use crate::utils::paths;

/// Errors reading an import manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {}: {source}", .path.display())]
    Io {
        /// Manifest path.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not a JSON object of string arrays.
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serves direct imports from an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct ManifestLister {
    imports: BTreeMap<String, BTreeSet<String>>,
}

impl ManifestLister {
    /// Builds a lister from `(package, imports)` pairs. Package and import
    /// paths are normalized.
    pub fn new<P, I, S>(entries: impl IntoIterator<Item = (P, I)>) -> Self
    where
        P: AsRef<str>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let imports = entries
            .into_iter()
            .map(|(package, imports)| {
                (
                    paths::normalize(package.as_ref()).to_string(),
                    imports
                        .into_iter()
                        .map(|i| paths::normalize(i.as_ref()).to_string())
                        .collect(),
                )
            })
            .collect();
        Self { imports }
    }

    /// Parses a JSON manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Json`] if the text is not an object mapping
    /// strings to string arrays.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self::new(raw))
    }

    /// Reads and parses a JSON manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lister = Self::from_json(&json)?;
        debug!("Loaded {} package(s) from {}", lister.len(), path.display());
        Ok(lister)
    }

    /// Returns the number of packages in the manifest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    /// Returns true if the manifest is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Returns every manifest package at or below `prefix`, sorted.
    #[must_use]
    pub fn packages_under(&self, prefix: &str) -> Vec<String> {
        let prefix = paths::normalize(prefix);
        self.imports
            .keys()
            .filter(|package| paths::prefix_matches(package, prefix))
            .cloned()
            .collect()
    }
}

impl ImportLister for ManifestLister {
    fn list_direct_imports(&self, package: &str) -> Result<BTreeSet<String>, ImportLookupError> {
        self.imports
            .get(paths::normalize(package))
            .cloned()
            .ok_or_else(|| ImportLookupError::Unresolved {
                package: package.to_string(),
                reason: "not present in import manifest".to_string(),
            })
    }
}
