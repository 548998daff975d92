//! Import Graph Builder.
//!
//! Expands the transitive import closure of a root package breadth-first,
//! one level at a time. Lister calls of a level run on the current rayon
//! pool.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, trace};

use crate::utils::paths;

/// The collaborator could not resolve a package's imports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportLookupError {
    /// The package does not exist or cannot be located.
    #[error("cannot resolve package `{package}`: {reason}")]
    Unresolved {
        /// Package that failed.
        package: String,
        /// Why it failed.
        reason: String,
    },

    /// The package exists but its sources could not be read or parsed.
    #[error("failed to list imports of `{package}`: {message}")]
    Io {
        /// Package that failed.
        package: String,
        /// Error detail.
        message: String,
    },
}

impl ImportLookupError {
    /// Returns the package the lookup failed for.
    #[must_use]
    pub fn package(&self) -> &str {
        match self {
            Self::Unresolved { package, .. } | Self::Io { package, .. } => package,
        }
    }
}

/// Enumerates the direct imports of a package.
///
/// Implementations must be safe to call from several threads at once.
pub trait ImportLister: Send + Sync {
    /// Returns the package paths `package` imports directly.
    ///
    /// # Errors
    ///
    /// Returns [`ImportLookupError`] if the package cannot be resolved.
    fn list_direct_imports(&self, package: &str) -> Result<BTreeSet<String>, ImportLookupError>;
}

impl<T: ImportLister + ?Sized> ImportLister for Box<T> {
    fn list_direct_imports(&self, package: &str) -> Result<BTreeSet<String>, ImportLookupError> {
        (**self).list_direct_imports(package)
    }
}

impl<T: ImportLister + ?Sized> ImportLister for &T {
    fn list_direct_imports(&self, package: &str) -> Result<BTreeSet<String>, ImportLookupError> {
        (**self).list_direct_imports(package)
    }
}

/// Cooperative cancellation flag shared by every root of a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an untripped token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once the token has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why an expansion stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A package's imports could not be listed.
    #[error(transparent)]
    Lookup(#[from] ImportLookupError),

    /// The run was cancelled before the expansion finished.
    #[error("cancelled")]
    Cancelled,
}

/// The transitive import graph of one root package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportGraph {
    root: String,
    nodes: BTreeMap<String, BTreeSet<String>>,
}

impl ImportGraph {
    /// Returns the root package.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the number of expanded packages, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph holds no package.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `package` was expanded.
    #[must_use]
    pub fn contains(&self, package: &str) -> bool {
        self.nodes.contains_key(package)
    }

    /// Returns the direct imports of an expanded package.
    #[must_use]
    pub fn imports_of(&self, package: &str) -> Option<&BTreeSet<String>> {
        self.nodes.get(package)
    }

    /// Iterates over all `(importer, imported)` edges in sorted order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.iter().flat_map(|(importer, imports)| {
            imports
                .iter()
                .map(move |imported| (importer.as_str(), imported.as_str()))
        })
    }
}

/// Expands the import graph of `root` without cancellation.
///
/// # Errors
///
/// Returns [`ExpandError::Lookup`] if any reachable package cannot be listed.
pub fn expand(root: &str, lister: &dyn ImportLister) -> Result<ImportGraph, ExpandError> {
    expand_with(root, lister, &CancellationToken::new())
}

/// Expands the import graph of `root`, checking `cancel` before each level
/// and each lister call.
///
/// # Errors
///
/// Returns [`ExpandError::Lookup`] for the failing package earliest in sorted
/// order within the first failing level, or [`ExpandError::Cancelled`].
pub fn expand_with(
    root: &str,
    lister: &dyn ImportLister,
    cancel: &CancellationToken,
) -> Result<ImportGraph, ExpandError> {
    let root = paths::normalize(root).to_string();
    let mut nodes = BTreeMap::new();
    let mut seen: HashSet<String> = HashSet::from([root.clone()]);
    let mut frontier = vec![root.clone()];
    let mut depth = 0usize;

    while !frontier.is_empty() {
        if cancel.is_cancelled() {
            return Err(ExpandError::Cancelled);
        }
        frontier.sort_unstable();
        trace!("{}: level {} with {} package(s)", root, depth, frontier.len());

        let listed: Vec<Result<BTreeSet<String>, ExpandError>> = frontier
            .par_iter()
            .map(|package| {
                if cancel.is_cancelled() {
                    return Err(ExpandError::Cancelled);
                }
                lister
                    .list_direct_imports(package)
                    .map_err(ExpandError::Lookup)
            })
            .collect();

        let mut next = Vec::new();
        for (package, result) in frontier.into_iter().zip(listed) {
            let imports = result?;
            for imported in &imports {
                if seen.insert(imported.clone()) {
                    next.push(imported.clone());
                }
            }
            nodes.insert(package, imports);
        }

        frontier = next;
        depth += 1;
    }

    debug!("{}: expanded {} package(s)", root, nodes.len());
    Ok(ImportGraph { root, nodes })
}

/// Wraps a lister with a concurrency-safe cache of successful lookups.
///
/// Failures are not cached, so every root that reaches a broken package
/// reports the failure itself.
#[derive(Debug)]
pub struct CachedLister<L> {
    inner: L,
    cache: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl<L: ImportLister> CachedLister<L> {
    /// Wraps `inner`.
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the number of cached packages.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<L: ImportLister> ImportLister for CachedLister<L> {
    fn list_direct_imports(&self, package: &str) -> Result<BTreeSet<String>, ImportLookupError> {
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(package)
        {
            return Ok(hit.clone());
        }

        let imports = self.inner.list_direct_imports(package)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(package.to_string())
            .or_insert_with(|| imports.clone());
        Ok(imports)
    }
}
