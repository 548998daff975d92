//! Configuration types for import-fence.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::rules::DEFAULT_RULE_FILE;
use crate::store::LoadOptions;

/// File names searched for in a project root, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["import-fence.toml", ".import-fence.toml"];

/// Top-level configuration for import-fence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Checker configuration.
    #[serde(default)]
    pub checker: CheckerConfig,

    /// Lister-specific sections such as `[go]`, kept raw.
    #[serde(flatten)]
    pub sections: BTreeMap<String, toml::Value>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_named(path, &content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::parse_named(Path::new(CONFIG_FILE_NAMES[0]), content)
    }

    fn parse_named(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::syntax(path, content, &e))
    }

    /// Deserializes the named extra section, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Section`] if the section has the wrong shape.
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        self.sections
            .get(name)
            .map(|value| {
                value.clone().try_into().map_err(|e: toml::de::Error| {
                    ConfigError::Section {
                        section: name.to_string(),
                        message: e.message().to_string(),
                    }
                })
            })
            .transpose()
    }

    /// Returns the rule discovery options described by this configuration.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            rule_file: self.checker.rule_file.clone(),
            exclude: self.checker.exclude.clone(),
            respect_gitignore: self.checker.respect_gitignore,
        }
    }
}

/// Checker-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckerConfig {
    /// Name of the per-directory rule file (default: `.import-rules.toml`).
    #[serde(default = "default_rule_file")]
    pub rule_file: String,

    /// Glob patterns of directories skipped during rule discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of worker threads.
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Whether the first inspection failure cancels the remaining roots.
    #[serde(default)]
    pub fail_fast: bool,

    /// Root packages checked when none are given on the command line.
    #[serde(default)]
    pub targets: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            rule_file: default_rule_file(),
            exclude: Vec::new(),
            respect_gitignore: true,
            jobs: None,
            fail_fast: false,
            targets: Vec::new(),
        }
    }
}

fn default_rule_file() -> String {
    DEFAULT_RULE_FILE.to_string()
}

fn default_true() -> bool {
    true
}

/// Returns the first configuration file present in `root`.
#[must_use]
pub fn find_project_config(root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}
