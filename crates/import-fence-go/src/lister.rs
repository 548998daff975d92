//! Import lister for a Go source tree.
//!
//! Packages are repository-relative directories. Imports below the module
//! path map to repository-relative packages; other imports keep their full
//! path and are looked up in the vendor directory, or treated as standard
//! library leaves when their first segment has no dot.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use import_fence_core::utils::paths;
use import_fence_core::{ImportLister, ImportLookupError};

use crate::config::GoConfig;
use crate::extractor::LanguageExtractor;
use crate::go::GoExtractor;

/// Lists direct imports of Go packages by parsing their source files.
pub struct GoImportLister {
    root: PathBuf,
    module: Option<String>,
    vendor_dir: String,
    include_tests: bool,
    respect_gitignore: bool,
    extractor: GoExtractor,
}

impl std::fmt::Debug for GoImportLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoImportLister")
            .field("root", &self.root)
            .field("module", &self.module)
            .field("vendor_dir", &self.vendor_dir)
            .field("include_tests", &self.include_tests)
            .field("respect_gitignore", &self.respect_gitignore)
            .finish_non_exhaustive()
    }
}

impl GoImportLister {
    /// Creates a lister for the tree at `root`.
    ///
    /// The module path comes from `config`, or from `<root>/go.mod`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: &GoConfig) -> Self {
        let root = root.into();
        let module = config.module_or_detect(&root);
        match &module {
            Some(m) => debug!("Go module: {}", m),
            None => warn!("No Go module path configured or found in go.mod"),
        }
        Self {
            root,
            module,
            vendor_dir: paths::normalize(&config.vendor_dir).to_string(),
            include_tests: config.include_tests,
            respect_gitignore: true,
            extractor: GoExtractor::new(),
        }
    }

    /// Sets whether package discovery honors `.gitignore` files
    /// (default: true).
    #[must_use]
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Returns the module path in use.
    #[must_use]
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Maps an import path to a package path.
    #[must_use]
    pub fn map_import<'a>(&self, import: &'a str) -> &'a str {
        match &self.module {
            Some(module) if import == module => "",
            Some(module) => import
                .strip_prefix(module.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(import),
            None => import,
        }
    }

    /// Returns every package directory at or below `prefix` holding Go
    /// files, sorted.
    ///
    /// Like `go list ./...`, this skips the vendor directory, `testdata`,
    /// directories starting with `.` or `_`, and nested modules.
    ///
    /// # Errors
    ///
    /// Returns [`ImportLookupError::Unresolved`] if `prefix` is not a
    /// directory inside the repository and [`ImportLookupError::Io`] if the
    /// tree cannot be walked.
    pub fn discover_packages(&self, prefix: &str) -> Result<Vec<String>, ImportLookupError> {
        let prefix = paths::normalize(prefix);
        if leaves_root(prefix) {
            return Err(outside_root(prefix));
        }
        let start = self.root.join(prefix);
        if !start.is_dir() {
            return Err(ImportLookupError::Unresolved {
                package: prefix.to_string(),
                reason: "no such directory".to_string(),
            });
        }

        let root = self.root.clone();
        let vendor = self.vendor_dir.clone();
        let mut builder = ignore::WalkBuilder::new(&start);
        builder
            .hidden(false)
            .git_global(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') || name.starts_with('_') || name == "testdata" {
                    return false;
                }
                let rel =
                    paths::from_relative(entry.path().strip_prefix(&root).unwrap_or(entry.path()));
                rel != vendor && !entry.path().join("go.mod").is_file()
            });

        let mut packages = BTreeSet::new();
        for result in builder.build() {
            let entry = result.map_err(|e| ImportLookupError::Io {
                package: prefix.to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !self.is_source_file(&name) {
                continue;
            }
            if let Some(dir) = entry.path().parent() {
                packages.insert(paths::from_relative(
                    dir.strip_prefix(&self.root).unwrap_or(dir),
                ));
            }
        }

        debug!(
            "Discovered {} package(s) under {}",
            packages.len(),
            paths::display_dir(prefix)
        );
        Ok(packages.into_iter().collect())
    }

    fn is_source_file(&self, name: &str) -> bool {
        self.extractor.handles(name)
            && !name.starts_with('.')
            && !name.starts_with('_')
            && (self.include_tests || !name.ends_with("_test.go"))
    }

    /// Standard library paths have no dot in their first segment. A first
    /// segment naming a repository directory marks a missing local package
    /// instead.
    fn is_standard_library(&self, package: &str) -> bool {
        let first = package.split('/').next().unwrap_or("");
        !first.is_empty() && !first.contains('.') && !self.root.join(first).is_dir()
    }

    /// Locates the directory holding `package`.
    fn locate(&self, package: &str) -> Option<PathBuf> {
        let local = self.root.join(package);
        if local.is_dir() {
            return Some(local);
        }
        let vendored = self.root.join(&self.vendor_dir).join(package);
        vendored.is_dir().then_some(vendored)
    }

    fn source_files(&self, package: &str, dir: &Path) -> Result<Vec<PathBuf>, ImportLookupError> {
        let io_error = |e: std::io::Error| ImportLookupError::Io {
            package: package.to_string(),
            message: e.to_string(),
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let name = entry.file_name();
            if entry.file_type().map_err(io_error)?.is_file()
                && self.is_source_file(&name.to_string_lossy())
            {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

impl ImportLister for GoImportLister {
    fn list_direct_imports(&self, package: &str) -> Result<BTreeSet<String>, ImportLookupError> {
        let package = paths::normalize(package);
        if leaves_root(package) {
            return Err(outside_root(package));
        }

        let Some(dir) = self.locate(package) else {
            if self.is_standard_library(package) {
                trace!("{} is a standard library leaf", package);
                return Ok(BTreeSet::new());
            }
            return Err(ImportLookupError::Unresolved {
                package: package.to_string(),
                reason: format!(
                    "not found in the repository or {}/",
                    paths::display_dir(&self.vendor_dir)
                ),
            });
        };

        let files = self.source_files(package, &dir)?;
        if files.is_empty() {
            return Err(ImportLookupError::Unresolved {
                package: package.to_string(),
                reason: format!("no Go files in {}", dir.display()),
            });
        }

        let mut imports = BTreeSet::new();
        for file in &files {
            let source = std::fs::read_to_string(file).map_err(|e| ImportLookupError::Io {
                package: package.to_string(),
                message: format!("{}: {e}", file.display()),
            })?;
            let analysis = self
                .extractor
                .analyze(&source)
                .map_err(|e| ImportLookupError::Io {
                    package: package.to_string(),
                    message: format!("{}: {e}", file.display()),
                })?;
            if analysis.has_errors {
                warn!("Syntax errors in {}, imports may be incomplete", file.display());
            }
            for import in analysis.imports {
                imports.insert(self.map_import(&import.path).to_string());
            }
        }

        trace!("{}: {} import(s) from {} file(s)", package, imports.len(), files.len());
        Ok(imports)
    }
}

/// True for paths with `.` or `..` segments, which could resolve outside
/// the repository.
fn leaves_root(package: &str) -> bool {
    package.split('/').any(|segment| segment == ".." || segment == ".")
}

fn outside_root(package: &str) -> ImportLookupError {
    ImportLookupError::Unresolved {
        package: package.to_string(),
        reason: "path leaves the repository root".to_string(),
    }
}
