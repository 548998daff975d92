//! Subcommand implementations.

pub mod check;
pub mod explain;
pub mod init;
pub mod output;

use anyhow::Result;
use import_fence_core::Config;
use std::path::Path;

use crate::config_resolver::ConfigLocator;

/// Loads the tool configuration for the repository at `root`.
fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config> {
    match ConfigLocator::new(root).locate(explicit).path() {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::default()),
    }
}

/// Fails unless `root` is an existing directory.
fn ensure_root(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        anyhow::bail!("repository root {} is not a directory", root.display())
    }
}
