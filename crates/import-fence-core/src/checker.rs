//! Checker: orchestrates expansion and evaluation for many root packages.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::evaluator::evaluate;
use crate::graph::{self, CachedLister, CancellationToken, ExpandError, ImportLister};
use crate::resolver::Resolver;
use crate::store::RuleStore;
use crate::types::{CheckReport, RootReport, RootStatus};
use crate::utils::paths;

/// Errors that prevent a check from running at all.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// No import lister was configured.
    #[error("no import lister configured")]
    MissingLister,

    /// The worker pool could not be created.
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring a [`Checker`].
#[derive(Default)]
pub struct CheckerBuilder {
    store: Option<RuleStore>,
    lister: Option<Box<dyn ImportLister>>,
    jobs: Option<usize>,
    fail_fast: bool,
}

impl CheckerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the loaded rules (default: no rules, everything allowed).
    #[must_use]
    pub fn store(mut self, store: RuleStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the import lister.
    #[must_use]
    pub fn lister<L: ImportLister + 'static>(mut self, lister: L) -> Self {
        self.lister = Some(Box::new(lister));
        self
    }

    /// Sets a boxed import lister.
    #[must_use]
    pub fn lister_box(mut self, lister: Box<dyn ImportLister>) -> Self {
        self.lister = Some(lister);
        self
    }

    /// Sets the number of worker threads (default: available parallelism).
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Sets whether the first inspection failure cancels the remaining
    /// roots (default: false).
    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Builds the checker.
    ///
    /// # Errors
    ///
    /// Returns [`CheckerError::MissingLister`] if no lister was set.
    pub fn build(self) -> Result<Checker, CheckerError> {
        Ok(Checker {
            store: self.store.unwrap_or_default(),
            lister: self.lister.ok_or(CheckerError::MissingLister)?,
            jobs: self.jobs.filter(|&n| n > 0),
            fail_fast: self.fail_fast,
        })
    }
}

/// Checks root packages against the loaded rules.
///
/// Use [`Checker::builder()`] to construct an instance.
pub struct Checker {
    store: RuleStore,
    lister: Box<dyn ImportLister>,
    jobs: Option<usize>,
    fail_fast: bool,
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("rules", &self.store.len())
            .field("jobs", &self.jobs)
            .field("fail_fast", &self.fail_fast)
            .finish_non_exhaustive()
    }
}

impl Checker {
    /// Creates a new builder for configuring a checker.
    #[must_use]
    pub fn builder() -> CheckerBuilder {
        CheckerBuilder::new()
    }

    /// Returns the loaded rules.
    #[must_use]
    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// Checks every target and returns one outcome per distinct target, in
    /// the order given.
    ///
    /// # Errors
    ///
    /// Returns [`CheckerError::Pool`] if the worker pool cannot be started.
    pub fn run<S: AsRef<str>>(&self, targets: &[S]) -> Result<CheckReport, CheckerError> {
        let mut roots: Vec<&str> = Vec::with_capacity(targets.len());
        for target in targets {
            let root = paths::normalize(target.as_ref());
            if !roots.contains(&root) {
                roots.push(root);
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .thread_name(|i| format!("import-fence-{i}"))
            .build()?;

        info!(
            "Checking {} root(s) on {} worker(s)",
            roots.len(),
            pool.current_num_threads()
        );

        let resolver = Resolver::new(&self.store);
        let lister = CachedLister::new(self.lister.as_ref());
        let cancel = CancellationToken::new();

        let reports: Vec<RootReport> = pool.install(|| {
            roots
                .par_iter()
                .map(|root| self.check_root(root, &resolver, &lister, &cancel))
                .collect()
        });

        let report = CheckReport::new(reports);
        info!(
            "Check complete: {} violation(s), {} package(s) visited, {} listed",
            report.violations().len(),
            report.packages_visited(),
            lister.cached()
        );
        Ok(report)
    }

    fn check_root(
        &self,
        root: &str,
        resolver: &Resolver<'_>,
        lister: &dyn ImportLister,
        cancel: &CancellationToken,
    ) -> RootReport {
        debug!("Checking {}", paths::display_dir(root));

        let status = match graph::expand_with(root, lister, cancel) {
            Ok(graph) => RootStatus::Checked {
                packages_visited: graph.len(),
                violations: evaluate(&graph, resolver),
            },
            Err(ExpandError::Lookup(error)) => {
                warn!("Cannot inspect {}: {}", paths::display_dir(root), error);
                if self.fail_fast {
                    cancel.cancel();
                }
                RootStatus::InspectionFailed { error }
            }
            Err(ExpandError::Cancelled) => RootStatus::Cancelled,
        };

        RootReport {
            root: root.to_string(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestLister;
    use crate::rules::{Prefix, Rule};
    use crate::types::ExitStatus;

    fn lister() -> ManifestLister {
        ManifestLister::new([
            ("cmd/a", vec!["pkg/lib"]),
            ("cmd/b", vec!["pkg/lib", "missing"]),
            ("pkg/lib", vec!["third_party/x"]),
            ("third_party/x", vec![]),
        ])
    }

    fn store() -> RuleStore {
        RuleStore::from_rules([Rule::new(
            "pkg",
            vec![Prefix::new("pkg").unwrap()],
            vec![],
            false,
        )])
    }

    #[test]
    fn builder_requires_lister() {
        assert!(matches!(
            Checker::builder().build(),
            Err(CheckerError::MissingLister)
        ));
    }

    #[test]
    fn reports_each_root_in_order() {
        let checker = Checker::builder()
            .store(store())
            .lister(lister())
            .jobs(2)
            .build()
            .unwrap();
        let report = checker.run(&["cmd/b", "cmd/a", "./cmd/a/"]).unwrap();

        let roots: Vec<&str> = report.roots.iter().map(|r| r.root.as_str()).collect();
        assert_eq!(roots, vec!["cmd/b", "cmd/a"]);
        assert!(matches!(
            report.roots[0].status,
            RootStatus::InspectionFailed { .. }
        ));
        assert_eq!(report.violations().len(), 1);
        assert_eq!(report.exit_status(), ExitStatus::Error);
    }

    #[test]
    fn clean_run() {
        let checker = Checker::builder()
            .lister(lister())
            .build()
            .unwrap();
        let report = checker.run(&["cmd/a"]).unwrap();
        assert_eq!(report.exit_status(), ExitStatus::Clean);
        assert_eq!(report.packages_visited(), 3);
    }
}
