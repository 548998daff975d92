//! Explain command implementation.

use anyhow::Result;
use import_fence_core::{utils::paths, ExitStatus, Resolver, RuleStore, SourcedPrefix};
use std::path::Path;

/// Prints the effective rule set of `package` and where each prefix came from.
pub fn run(
    package: &str,
    root: &Path,
    rule_file: Option<String>,
    config_path: Option<&Path>,
) -> Result<ExitStatus> {
    super::ensure_root(root)?;
    let config = super::load_config(root, config_path)?;

    let mut options = config.load_options();
    if let Some(rule_file) = rule_file {
        options.rule_file = rule_file;
    }
    let store = RuleStore::load(root, &options)?;
    let resolver = Resolver::new(&store);

    let package = paths::normalize(package);
    let effective = resolver.resolve(package);

    println!("package: {}", paths::display_dir(package));
    if effective.is_default() {
        println!("  no {} above this package; every import is allowed", options.rule_file);
        return Ok(ExitStatus::Clean);
    }

    let chain: Vec<&str> = effective
        .chain()
        .iter()
        .map(|dir| paths::display_dir(dir))
        .collect();
    println!("  rules: {}", chain.join(" <- "));

    print_prefixes("allowed", effective.allowed());
    print_prefixes("forbidden", effective.forbidden());

    println!("  sources:");
    for dir in effective.chain() {
        if let Some(source) = store.rule(dir).and_then(|r| r.source()) {
            println!("    {}", source.display());
        }
    }

    Ok(ExitStatus::Clean)
}

fn print_prefixes(label: &str, prefixes: &[SourcedPrefix]) {
    if prefixes.is_empty() {
        println!("  {label}: (none)");
        return;
    }
    println!("  {label}:");
    for p in prefixes {
        let prefix = if p.prefix().is_everything() {
            "\"\" (everything)"
        } else {
            p.prefix().as_str()
        };
        match p.declared_in() {
            Some(dir) => println!("    {prefix}  (from {})", paths::display_dir(dir)),
            None => println!("    {prefix}"),
        }
    }
}
