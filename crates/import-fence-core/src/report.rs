//! Violation Reporter: deterministic rendering of check results.

use std::fmt::Write;

use serde::Serialize;

use crate::types::{CheckReport, ExitStatus, RootReport, RootStatus, Violation};
use crate::utils::paths;

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text grouped by importer.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// One line per finding.
    Compact,
}

/// Renders a violation list as human text and computes its exit status.
///
/// Violations are grouped by importer. Each group shows the resolution chain
/// of the importer, nearest rule directory first.
#[must_use]
pub fn report(violations: &[Violation]) -> (String, ExitStatus) {
    let mut sorted: Vec<&Violation> = violations.iter().collect();
    sorted.sort();
    sorted.dedup();

    let status = if sorted.is_empty() {
        ExitStatus::Clean
    } else {
        ExitStatus::Violations
    };
    (render_groups(&sorted), status)
}

/// Renders a full check report in `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(report: &CheckReport, format: Format) -> Result<String, serde_json::Error> {
    match format {
        Format::Text => Ok(render_text(report)),
        Format::Json => render_json(report),
        Format::Compact => Ok(render_compact(report)),
    }
}

fn render_groups(violations: &[&Violation]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;

    for v in violations {
        if current != Some(v.importer.as_str()) {
            if current.is_some() {
                out.push('\n');
            }
            current = Some(v.importer.as_str());
            let _ = writeln!(out, "{}", paths::display_dir(&v.importer));
            let chain: Vec<&str> = v
                .resolution_chain
                .iter()
                .map(|d| paths::display_dir(d))
                .collect();
            let _ = writeln!(out, "  rules: {}", chain.join(" <- "));
        }
        let _ = writeln!(out, "  -> {}: {}", v.imported, v.matched_rule);
    }
    out
}

fn render_text(report: &CheckReport) -> String {
    let violations = report.violations();
    let mut out = render_groups(&violations);

    let failures = report.failures();
    if !failures.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        for (root, error) in &failures {
            let _ = writeln!(out, "error: cannot inspect {}: {error}", paths::display_dir(root));
        }
    }
    for root in report.cancelled() {
        let _ = writeln!(out, "cancelled: {}", paths::display_dir(root));
    }

    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "Checked {} root(s), {} package(s) visited: {} violation(s), {} inspection failure(s)",
        report.roots.len(),
        report.packages_visited(),
        violations.len(),
        failures.len(),
    );
    out
}

fn render_compact(report: &CheckReport) -> String {
    let mut out = String::new();
    for v in report.violations() {
        let _ = writeln!(out, "{v}");
    }
    for (root, error) in report.failures() {
        let _ = writeln!(out, "{}: error: {error}", paths::display_dir(root));
    }
    for root in report.cancelled() {
        let _ = writeln!(out, "{}: cancelled", paths::display_dir(root));
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    exit_code: u8,
    violations: Vec<&'a Violation>,
    roots: Vec<JsonRoot<'a>>,
}

/// Per-root summary; violations are listed once at the top level.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRoot<'a> {
    root: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    packages_visited: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a RootReport> for JsonRoot<'a> {
    fn from(r: &'a RootReport) -> Self {
        let mut root = JsonRoot {
            root: &r.root,
            status: "checked",
            packages_visited: None,
            violations: None,
            error: None,
        };
        match &r.status {
            RootStatus::Checked {
                packages_visited,
                violations,
            } => {
                root.packages_visited = Some(*packages_visited);
                root.violations = Some(violations.len());
            }
            RootStatus::InspectionFailed { error } => {
                root.status = "inspection-failed";
                root.error = Some(error.to_string());
            }
            RootStatus::Cancelled => root.status = "cancelled",
        }
        root
    }
}

fn render_json(report: &CheckReport) -> Result<String, serde_json::Error> {
    let json = JsonReport {
        exit_code: report.exit_status().code(),
        violations: report.violations(),
        roots: report.roots.iter().map(JsonRoot::from).collect(),
    };
    let mut out = serde_json::to_string_pretty(&json)?;
    out.push('\n');
    Ok(out)
}
