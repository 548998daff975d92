//! Integration test: rule files on disk, manifest lister, checker and report.
//!
//! Uses the fixture tree under `tests/fixtures/boundary/` to run the full
//! load → resolve → expand → evaluate → report pipeline.

use import_fence_core::report::{render, report};
use import_fence_core::{
    evaluate, graph, CheckReport, Checker, ConfigError, ExitStatus, LoadOptions, ManifestLister,
    MatchReason, Resolver, RootStatus, RuleStore, Violation,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/boundary")
}

fn fixture_store() -> RuleStore {
    RuleStore::load(&fixture_root(), &LoadOptions::default()).expect("fixture rules should load")
}

fn fixture_lister() -> ManifestLister {
    ManifestLister::from_file(&fixture_root().join("imports.json"))
        .expect("fixture manifest should parse")
}

fn run(targets: &[&str], fail_fast: bool, jobs: usize) -> CheckReport {
    Checker::builder()
        .store(fixture_store())
        .lister(fixture_lister())
        .jobs(jobs)
        .fail_fast(fail_fast)
        .build()
        .expect("checker should build")
        .run(targets)
        .expect("worker pool should start")
}

fn pairs(violations: &[&Violation]) -> Vec<(String, String)> {
    violations
        .iter()
        .map(|v| (v.importer.clone(), v.imported.clone()))
        .collect()
}

// ── Full pipeline ──

#[test]
fn detects_expected_violations() {
    let report = run(&["cmd/app"], false, 2);
    assert_eq!(report.exit_status(), ExitStatus::Violations);
    assert_eq!(
        pairs(&report.violations()),
        vec![
            ("extensions".to_string(), "third_party/lib".to_string()),
            ("pkg/apis/foo".to_string(), "internal/secret".to_string()),
            ("pkg/util".to_string(), "third_party/forbidden/x".to_string()),
        ]
    );
}

#[test]
fn violation_reasons_and_chains() {
    let report = run(&["cmd/app"], false, 2);
    let violations = report.violations();

    assert_eq!(
        violations[0].matched_rule,
        MatchReason::Forbidden {
            prefix: "third_party".to_string(),
            declared_in: "extensions".to_string(),
        }
    );
    assert_eq!(violations[0].resolution_chain, vec!["extensions"]);

    assert_eq!(violations[1].matched_rule, MatchReason::NoAllowedPrefix);
    assert_eq!(violations[1].resolution_chain, vec!["pkg/apis/foo"]);

    // The forbidden prefix comes from the root rule through inheritance.
    assert_eq!(
        violations[2].matched_rule,
        MatchReason::Forbidden {
            prefix: "third_party/forbidden".to_string(),
            declared_in: String::new(),
        }
    );
    assert_eq!(violations[2].resolution_chain, vec!["pkg", ""]);
}

#[test]
fn text_report_explains_each_importer() {
    let report = run(&["cmd/app"], false, 1);
    let text = render(&report, import_fence_core::Format::Text).unwrap();
    assert!(text.contains("pkg/util\n  rules: pkg <- .\n"), "{text}");
    assert!(text.contains("(declared in .)"), "{text}");
}

#[test]
fn cycles_terminate_without_violation() {
    let report = run(&["cycle/a"], false, 2);
    assert_eq!(report.exit_status(), ExitStatus::Clean);
    assert_eq!(report.packages_visited(), 2);
}

#[test]
fn same_result_for_any_worker_count() {
    let targets = ["cmd/app", "extensions", "pkg/util", "cycle/b"];
    let single = run(&targets, false, 1);
    let many = run(&targets, false, 8);
    assert_eq!(single, many);
}

// ── Failures ──

#[test]
fn lookup_failure_is_separate_from_violations() {
    let report = run(&["broken", "cmd/app"], false, 2);
    assert_eq!(report.exit_status(), ExitStatus::Error);
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "broken");
    assert_eq!(failures[0].1.package(), "nowhere");
    // The other root is still checked.
    assert_eq!(report.violations().len(), 3);
}

#[test]
fn fail_fast_cancels_remaining_roots() {
    // One worker checks roots in order, so the failure comes first.
    let report = run(&["broken", "cmd/app", "cycle/a"], true, 1);
    assert!(matches!(
        report.roots[0].status,
        RootStatus::InspectionFailed { .. }
    ));
    assert_eq!(report.cancelled(), vec!["cmd/app", "cycle/a"]);
    assert_eq!(report.exit_status(), ExitStatus::Error);
}

#[test]
fn without_fail_fast_every_root_is_reported() {
    let report = run(&["broken", "cmd/app", "cycle/a"], false, 1);
    assert!(report.cancelled().is_empty());
    assert!(report.roots[2].passed());
}

#[test]
fn malformed_rule_file_aborts_load() {
    let tmp = tempfile::tempdir().unwrap();
    copy_tree(&fixture_root(), tmp.path());
    std::fs::create_dir_all(tmp.path().join("pkg/broken")).unwrap();
    std::fs::write(
        tmp.path().join("pkg/broken/.import-rules.toml"),
        "allowed = [\"pkg\"]\nforbidden = [1]\n",
    )
    .unwrap();

    let err = RuleStore::load(tmp.path(), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Syntax { line: 2, .. }));
    assert!(err
        .path()
        .unwrap()
        .ends_with("pkg/broken/.import-rules.toml"));
}

#[test]
fn forbid_everything_overrides_allow_everything() {
    let tmp = tempfile::tempdir().unwrap();
    copy_tree(&fixture_root(), tmp.path());
    std::fs::write(
        tmp.path().join("extensions/.import-rules.toml"),
        "allowed = [\"\"]\nforbidden = [\"\"]\n",
    )
    .unwrap();

    let store = RuleStore::load(tmp.path(), &LoadOptions::default()).unwrap();
    let report = Checker::builder()
        .store(store)
        .lister(fixture_lister())
        .build()
        .unwrap()
        .run(&["extensions"])
        .unwrap();

    assert_eq!(report.exit_status(), ExitStatus::Violations);
    let violations = report.violations();
    assert_eq!(
        pairs(&violations),
        vec![
            ("extensions".to_string(), "extensions/util".to_string()),
            ("extensions".to_string(), "third_party/lib".to_string()),
        ]
    );
    for v in violations {
        assert_eq!(
            v.matched_rule,
            MatchReason::Forbidden {
                prefix: String::new(),
                declared_in: "extensions".to_string(),
            }
        );
    }
}

// ── Direct component use ──

#[test]
fn resolver_is_idempotent_over_loaded_rules() {
    let store = fixture_store();
    let resolver = Resolver::new(&store);
    let first = resolver.resolve("pkg/apis/foo/v1");
    let second = resolver.resolve("pkg/apis/foo/v1");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.chain(), ["pkg/apis/foo"]);
}

#[test]
fn expand_and_evaluate_by_hand() {
    let store = fixture_store();
    let lister = fixture_lister();
    let graph = graph::expand("extensions", &lister).unwrap();
    let violations = evaluate(&graph, &Resolver::new(&store));
    let (text, status) = report(&violations);
    assert_eq!(status, ExitStatus::Violations);
    assert!(text.starts_with("extensions\n  rules: extensions\n"));
}

fn copy_tree(from: &Path, to: &Path) {
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            std::fs::create_dir_all(&target).unwrap();
            copy_tree(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}
