//! Init command implementation.

use anyhow::{bail, Context, Result};
use import_fence_core::{rules::DEFAULT_RULE_FILE, ExitStatus};
use std::path::Path;

const RULE_TEMPLATE: &str = r#"# import-fence rule declarations for this directory and its subpackages.
#
# Prefixes are repository-relative package paths or external import paths.
# A prefix matches itself and anything below it; "" matches every import.

# Imports that packages under this directory may use.
allowed = [""]

# Imports that are never permitted, even when an allowed prefix matches.
forbidden = []

# Append the rules of the nearest ancestor directory instead of replacing them.
inherit_from_ancestors = false
"#;

/// Runs the init command.
pub fn run(dir: &Path, force: bool) -> Result<ExitStatus> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let path = dir.join(DEFAULT_RULE_FILE);
    if path.exists() && !force {
        bail!(
            "Rule file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(&path, RULE_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {DEFAULT_RULE_FILE} to list allowed and forbidden prefixes");
    println!("  2. Run: import-fence check ./...");

    Ok(ExitStatus::Clean)
}
