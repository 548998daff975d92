//! Boundary Evaluator: checks every import edge against the importer's
//! effective rules.

use crate::graph::ImportGraph;
use crate::resolver::{Decision, Resolver};
use crate::types::{MatchReason, Violation};

/// Evaluates every edge of `graph`.
///
/// Returns the rejected edges sorted by importer, then imported.
#[must_use]
pub fn evaluate(graph: &ImportGraph, resolver: &Resolver<'_>) -> Vec<Violation> {
    let mut violations: Vec<Violation> = graph
        .edges()
        .filter_map(|(importer, imported)| {
            let rules = resolver.resolve(importer);
            let matched_rule = match rules.decide(imported) {
                Decision::Permitted => return None,
                Decision::Forbidden(hit) => MatchReason::Forbidden {
                    prefix: hit.prefix().as_str().to_string(),
                    declared_in: hit.declared_in().unwrap_or_default().to_string(),
                },
                Decision::NotAllowed => MatchReason::NoAllowedPrefix,
            };
            Some(Violation {
                importer: importer.to_string(),
                imported: imported.to_string(),
                matched_rule,
                resolution_chain: rules.chain().to_vec(),
            })
        })
        .collect();

    // Edges are already sorted; this keeps the guarantee independent of it.
    violations.sort();
    violations
}
