//! Rule Store: discovery and ownership of per-directory rules.
//!
//! Loading is the first of two phases. The whole tree is walked and every
//! declaration file parsed before any query is answered, so resolution is a
//! pure function of already-loaded state.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ConfigError;
use crate::rules::{parse_rule_file, Rule, DEFAULT_RULE_FILE};
use crate::utils::paths;

/// Options controlling rule file discovery.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File name of rule declarations (default: `.import-rules.toml`).
    pub rule_file: String,
    /// Glob patterns (relative to the root) of directories to skip.
    pub exclude: Vec<String>,
    /// Whether to respect `.gitignore` files.
    pub respect_gitignore: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            rule_file: DEFAULT_RULE_FILE.to_string(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// The immutable set of rules declared under a repository root, keyed by
/// directory.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: BTreeMap<String, Rule>,
}

impl RuleStore {
    /// Scans `root` for rule declaration files and parses every one of them.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found in walk order. No partial
    /// store is ever returned.
    pub fn load(root: &Path, options: &LoadOptions) -> Result<Self, ConfigError> {
        info!("Discovering {} files under {:?}", options.rule_file, root);

        let files = discover(root, options)?;
        let mut rules = BTreeMap::new();

        for file in files {
            let directory = file
                .parent()
                .and_then(|dir| dir.strip_prefix(root).ok())
                .map(paths::from_relative)
                .unwrap_or_default();

            let content = std::fs::read_to_string(&file).map_err(|source| ConfigError::Io {
                path: file.clone(),
                source,
            })?;
            let rule = parse_rule_file(&directory, &file, &content)?;

            debug!("Loaded rule for {}", paths::display_dir(&directory));
            rules.insert(directory, rule);
        }

        info!("Loaded {} rule file(s)", rules.len());
        Ok(Self { rules })
    }

    /// Builds a store from in-memory rules. A later rule for the same
    /// directory replaces an earlier one.
    #[must_use]
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|r| (r.directory().to_string(), r))
                .collect(),
        }
    }

    /// Returns the rule declared exactly at `directory`.
    #[must_use]
    pub fn rule(&self, directory: &str) -> Option<&Rule> {
        self.rules.get(paths::normalize(directory))
    }

    /// Returns the rule of `package`'s directory or of its closest ancestor.
    #[must_use]
    pub fn nearest(&self, package: &str) -> Option<&Rule> {
        paths::ancestors(paths::normalize(package)).find_map(|dir| self.rules.get(dir))
    }

    /// Returns the number of loaded rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over all rules ordered by directory.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }
}

/// Walks `root` in sorted order and collects rule declaration files.
fn discover(root: &Path, options: &LoadOptions) -> Result<Vec<PathBuf>, ConfigError> {
    if !root.is_dir() {
        return Err(ConfigError::Walk {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let excludes = options
        .exclude
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|e| ConfigError::Exclude {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let walk_root = root.to_path_buf();
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_global(false)
        .git_ignore(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            if entry.file_name() == ".git" {
                return false;
            }
            let rel = paths::from_relative(
                entry
                    .path()
                    .strip_prefix(&walk_root)
                    .unwrap_or(entry.path()),
            );
            let as_dir = format!("{rel}/");
            !excludes
                .iter()
                .any(|p| p.matches(&rel) || p.matches(&as_dir))
        });

    let wanted = OsStr::new(&options.rule_file);
    let mut files = Vec::new();
    for result in builder.build() {
        let entry = result.map_err(|e| ConfigError::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_some_and(|t| t.is_file()) && entry.file_name() == wanted {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
