//! Locating the tool configuration.
//!
//! Candidates, first hit wins:
//!
//! 1. the `--config` path, taken as given
//! 2. `import-fence.toml` or `.import-fence.toml` in the repository root
//! 3. `config.toml` in the user directory (`$IMPORT_FENCE_CONFIG_DIR`, else
//!    `~/.import-fence`)
//!
//! With no candidate the built-in defaults apply.

use std::path::{Path, PathBuf};

/// Environment variable overriding the user configuration directory.
pub const CONFIG_DIR_ENV: &str = "IMPORT_FENCE_CONFIG_DIR";

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed with `--config`.
    Explicit(PathBuf),
    /// Found in the repository root.
    Project(PathBuf),
    /// Found in the user configuration directory.
    User(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the configuration file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::User(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Short label for log output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "explicit",
            Self::Project(_) => "project",
            Self::User(_) => "user",
            Self::Default => "default",
        }
    }
}

/// Configuration lookup for one repository root.
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    repo_root: PathBuf,
    user_dir: Option<PathBuf>,
}

impl ConfigLocator {
    /// Creates a locator using the user directory from the environment.
    #[must_use]
    pub fn new(repo_root: &Path) -> Self {
        Self::with_user_dir(repo_root, user_config_dir())
    }

    /// Creates a locator with an explicit user directory.
    #[must_use]
    pub fn with_user_dir(repo_root: &Path, user_dir: Option<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            user_dir,
        }
    }

    /// Picks the configuration source. `explicit` is not checked for
    /// existence; reading it reports the problem.
    #[must_use]
    pub fn locate(&self, explicit: Option<&Path>) -> ConfigSource {
        let source = explicit
            .map(|p| ConfigSource::Explicit(p.to_path_buf()))
            .or_else(|| {
                import_fence_core::find_project_config(&self.repo_root).map(ConfigSource::Project)
            })
            .or_else(|| {
                self.user_dir
                    .as_deref()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|p| p.is_file())
                    .map(ConfigSource::User)
            })
            .unwrap_or(ConfigSource::Default);

        if let Some(path) = source.path() {
            tracing::debug!("Using {} config: {}", source.label(), path.display());
        }
        source
    }
}

/// Returns the user configuration directory.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".import-fence")))
}
