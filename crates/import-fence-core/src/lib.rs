//! # import-fence-core
//!
//! Core engine for checking package import boundaries against declarative
//! per-directory allow/forbid rules.
//!
//! This crate provides:
//!
//! - [`RuleStore`] for discovering and loading `.import-rules.toml` files
//! - [`Resolver`] for computing a package's effective rule set
//! - [`graph::expand`] for building a root package's transitive import graph
//!   through an injected [`ImportLister`]
//! - [`evaluate`] for checking every import edge against the importer's rules
//! - [`Checker`] for running many roots on a bounded worker pool
//! - [`report`](report::report) for deterministic human and JSON output
//!
//! ## Example
//!
//! ```ignore
//! use import_fence_core::{Checker, LoadOptions, ManifestLister, RuleStore};
//!
//! let store = RuleStore::load(root, &LoadOptions::default())?;
//! let checker = Checker::builder()
//!     .store(store)
//!     .lister(ManifestLister::from_file("imports.json".as_ref())?)
//!     .build()?;
//!
//! let report = checker.run(&["cmd/app"])?;
//! std::process::exit(report.exit_status().code().into());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod checker;
mod config;
mod error;
mod evaluator;
mod manifest;
mod resolver;
mod store;
mod types;

pub mod graph;
pub mod report;
pub mod rules;
/// Package path helpers.
pub mod utils;

pub use checker::{Checker, CheckerBuilder, CheckerError};
pub use config::{find_project_config, CheckerConfig, Config, CONFIG_FILE_NAMES};
pub use error::ConfigError;
pub use evaluator::evaluate;
pub use graph::{
    CachedLister, CancellationToken, ExpandError, ImportGraph, ImportLister, ImportLookupError,
};
pub use manifest::{ManifestError, ManifestLister};
pub use report::Format;
pub use resolver::{Decision, EffectiveRuleSet, Resolver, SourcedPrefix};
pub use store::{LoadOptions, RuleStore};
pub use types::{CheckReport, ExitStatus, MatchReason, RootReport, RootStatus, Violation};
