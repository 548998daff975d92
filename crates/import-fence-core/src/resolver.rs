//! Rule Resolver: effective rule sets per package.
//!
//! The nearest declared rule is authoritative. A rule that sets
//! `inherit_from_ancestors` appends the effective set of its parent
//! directory after its own prefixes, so inheritance continues upward only
//! while each merged rule opts in.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::rules::{Prefix, Rule};
use crate::store::RuleStore;
use crate::utils::paths;

/// A prefix together with the directory whose rule declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedPrefix {
    prefix: Prefix,
    declared_in: Option<String>,
}

impl SourcedPrefix {
    /// Returns the prefix.
    #[must_use]
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Returns the declaring directory; `None` for the built-in default.
    #[must_use]
    pub fn declared_in(&self) -> Option<&str> {
        self.declared_in.as_deref()
    }
}

/// Outcome of checking one import against an effective rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// The import is permitted.
    Permitted,
    /// The import matched a forbidden prefix.
    Forbidden(&'a SourcedPrefix),
    /// The import matched no allowed prefix.
    NotAllowed,
}

/// The allow/forbid prefixes that actually apply to a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveRuleSet {
    allowed: Vec<SourcedPrefix>,
    forbidden: Vec<SourcedPrefix>,
    chain: Vec<String>,
}

impl EffectiveRuleSet {
    /// The set used when no rule is declared anywhere above a package:
    /// everything allowed, nothing forbidden.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            allowed: vec![SourcedPrefix {
                prefix: Prefix::everything(),
                declared_in: None,
            }],
            forbidden: Vec::new(),
            chain: Vec::new(),
        }
    }

    fn from_rule(rule: &Rule) -> Self {
        let source = |prefix: &Prefix| SourcedPrefix {
            prefix: prefix.clone(),
            declared_in: Some(rule.directory().to_string()),
        };
        Self {
            allowed: rule.allowed().iter().map(source).collect(),
            forbidden: rule.forbidden().iter().map(source).collect(),
            chain: vec![rule.directory().to_string()],
        }
    }

    fn extend(&mut self, ancestor: &Self) {
        self.allowed.extend(ancestor.allowed.iter().cloned());
        self.forbidden.extend(ancestor.forbidden.iter().cloned());
        self.chain.extend(ancestor.chain.iter().cloned());
    }

    /// Returns true if no declared rule contributed to this set.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.chain.is_empty()
    }

    /// Returns the allowed prefixes, own rule first.
    #[must_use]
    pub fn allowed(&self) -> &[SourcedPrefix] {
        &self.allowed
    }

    /// Returns the forbidden prefixes, own rule first.
    #[must_use]
    pub fn forbidden(&self) -> &[SourcedPrefix] {
        &self.forbidden
    }

    /// Returns the directories whose rules were merged, nearest first.
    #[must_use]
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Decides whether `imported` is permitted.
    ///
    /// Forbidden prefixes are checked first and always win, regardless of
    /// how specific a matching allowed prefix is.
    #[must_use]
    pub fn decide(&self, imported: &str) -> Decision<'_> {
        if let Some(hit) = self.forbidden.iter().find(|p| p.prefix.matches(imported)) {
            return Decision::Forbidden(hit);
        }
        if self.allowed.iter().any(|p| p.prefix.matches(imported)) {
            Decision::Permitted
        } else {
            Decision::NotAllowed
        }
    }
}

/// Computes and memoizes effective rule sets.
///
/// Safe to share between threads: lookups take a read lock, and a miss is
/// computed outside the lock and then inserted. Two threads racing on the
/// same miss compute equal sets; the first insert wins and both return it.
#[derive(Debug)]
pub struct Resolver<'s> {
    store: &'s RuleStore,
    cache: RwLock<HashMap<String, Arc<EffectiveRuleSet>>>,
}

impl<'s> Resolver<'s> {
    /// Creates a resolver with an empty cache over `store`.
    #[must_use]
    pub fn new(store: &'s RuleStore) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the store this resolver reads from.
    #[must_use]
    pub fn store(&self) -> &'s RuleStore {
        self.store
    }

    /// Returns the effective rule set of `package`.
    ///
    /// Resolving the same path twice returns the same `Arc`.
    pub fn resolve(&self, package: &str) -> Arc<EffectiveRuleSet> {
        let key = paths::normalize(package);

        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(hit);
        }

        let computed = self.compute(key);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(key.to_string()).or_insert(computed))
    }

    /// Returns the number of memoized packages.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn compute(&self, key: &str) -> Arc<EffectiveRuleSet> {
        let Some(rule) = self.store.nearest(key) else {
            trace!("No rule above {}, allowing everything", paths::display_dir(key));
            return Arc::new(EffectiveRuleSet::allow_all());
        };

        // Packages below a rule directory share the directory's set.
        if rule.directory() != key {
            return self.resolve(rule.directory());
        }

        let mut set = EffectiveRuleSet::from_rule(rule);
        if rule.inherits_from_ancestors() {
            if let Some(parent) = paths::parent(rule.directory()) {
                let ancestor = self.resolve(parent);
                if !ancestor.is_default() {
                    set.extend(&ancestor);
                }
            }
        }
        trace!(
            "Resolved {} via {}",
            paths::display_dir(key),
            set.chain.join(" <- ")
        );
        Arc::new(set)
    }
}
