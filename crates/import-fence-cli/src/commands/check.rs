//! Check command implementation.

use anyhow::{bail, Result};
use import_fence_core::{Checker, ExitStatus, ImportLister, ManifestLister, RuleStore};
use import_fence_go::{GoConfig, GoImportLister};
use std::path::{Path, PathBuf};

use crate::OutputFormat;

/// Arguments of `import-fence check`.
#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Root packages to check; `dir/...` means every package below `dir`
    /// (default: `[checker] targets` from the configuration)
    pub targets: Vec<String>,

    /// Repository root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Number of worker threads (default: available parallelism)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Cancel the remaining roots after the first inspection failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Read imports from a JSON manifest instead of parsing Go sources
    #[arg(long, value_name = "MANIFEST")]
    pub imports: Option<PathBuf>,

    /// Go module path (default: read from go.mod)
    #[arg(long)]
    pub module: Option<String>,

    /// Include `_test.go` files when listing Go imports
    #[arg(long)]
    pub include_tests: bool,

    /// Name of the per-directory rule file
    #[arg(long)]
    pub rule_file: Option<String>,

    /// Exclude patterns for rule discovery (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

/// The lister selected for a run, before it is handed to the checker.
enum Source {
    Manifest(ManifestLister),
    Go(GoImportLister),
}

impl Source {
    fn packages_under(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(match self {
            Self::Manifest(m) => m.packages_under(prefix),
            Self::Go(g) => g.discover_packages(prefix)?,
        })
    }

    fn into_lister(self) -> Box<dyn ImportLister> {
        match self {
            Self::Manifest(m) => Box::new(m),
            Self::Go(g) => Box::new(g),
        }
    }
}

/// Runs the check command.
pub fn run(args: &CheckArgs, config_path: Option<&Path>) -> Result<ExitStatus> {
    super::ensure_root(&args.root)?;
    let config = super::load_config(&args.root, config_path)?;

    let mut options = config.load_options();
    if let Some(rule_file) = &args.rule_file {
        options.rule_file.clone_from(rule_file);
    }
    options.exclude.extend(args.exclude.iter().cloned());

    let store = RuleStore::load(&args.root, &options)?;

    let source = match &args.imports {
        Some(manifest) => Source::Manifest(ManifestLister::from_file(manifest)?),
        None => {
            let mut go = GoConfig::from_config(&config)?;
            if args.module.is_some() {
                go.module.clone_from(&args.module);
            }
            go.include_tests |= args.include_tests;
            Source::Go(
                GoImportLister::new(&args.root, &go)
                    .respect_gitignore(options.respect_gitignore),
            )
        }
    };

    let requested = if args.targets.is_empty() {
        &config.checker.targets
    } else {
        &args.targets
    };
    if requested.is_empty() {
        bail!("no targets given and no [checker] targets configured");
    }
    let targets = expand_targets(requested, &source)?;

    let mut builder = Checker::builder()
        .store(store)
        .lister_box(source.into_lister())
        .fail_fast(args.fail_fast || config.checker.fail_fast);
    if let Some(jobs) = args.jobs.or(config.checker.jobs) {
        builder = builder.jobs(jobs);
    }
    let checker = builder.build()?;

    tracing::info!(
        "Checking {} target(s) against {} rule file(s)",
        targets.len(),
        checker.store().len()
    );

    let report = checker.run(&targets)?;
    super::output::print(&report, args.format)?;

    Ok(report.exit_status())
}

/// Expands `dir/...` patterns; other targets are kept as given.
fn expand_targets(requested: &[String], source: &Source) -> Result<Vec<String>> {
    let mut targets = Vec::new();
    for target in requested {
        match recursive_prefix(target) {
            Some(prefix) => {
                let found = source.packages_under(prefix)?;
                if found.is_empty() {
                    tracing::warn!("Pattern {} matched no packages", target);
                }
                targets.extend(found);
            }
            None => targets.push(target.clone()),
        }
    }
    Ok(targets)
}

/// Returns the directory of a `dir/...` pattern.
fn recursive_prefix(target: &str) -> Option<&str> {
    let prefix = target.strip_suffix("...")?;
    if prefix.is_empty() || prefix.ends_with('/') {
        Some(prefix.trim_end_matches('/'))
    } else {
        None
    }
}
