use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "cmd/app": ["pkg/api", "internal/db"],
  "pkg/api": ["internal/db"],
  "internal/db": [],
  "tools/lint": ["pkg/api"],
  "broken": ["nowhere"]
}"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A repository whose `pkg` packages may not reach into `internal`.
fn repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "imports.json", MANIFEST);
    write(tmp.path(), ".import-rules.toml", "allowed = [\"\"]\n");
    write(
        tmp.path(),
        "pkg/.import-rules.toml",
        "allowed = [\"pkg\"]\nforbidden = [\"internal\"]\n",
    );
    tmp
}

fn cmd(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("import-fence").unwrap();
    cmd.current_dir(root)
        .env("IMPORT_FENCE_CONFIG_DIR", root.join(".no-global"));
    cmd
}

#[test]
fn clean_targets_exit_zero() {
    let tmp = repo();
    cmd(tmp.path())
        .args(["check", "--imports", "imports.json", "internal/db"])
        .assert()
        .code(0)
        .stdout(contains("0 violation(s)"));
}

#[test]
fn violations_exit_one() {
    let tmp = repo();
    cmd(tmp.path())
        .args(["check", "--imports", "imports.json", "cmd/app"])
        .assert()
        .code(1)
        .stdout(contains("pkg/api\n  rules: pkg\n"))
        .stdout(contains("-> internal/db: forbidden by prefix \"internal\""));
}

#[test]
fn lookup_failure_exits_two() {
    let tmp = repo();
    cmd(tmp.path())
        .args(["check", "--imports", "imports.json", "broken", "internal/db"])
        .assert()
        .code(2)
        .stdout(contains("error: cannot inspect broken"));
}

#[test]
fn json_output_is_machine_readable() {
    let tmp = repo();
    let output = cmd(tmp.path())
        .args([
            "check",
            "--imports",
            "imports.json",
            "--format",
            "json",
            "cmd/app",
            "tools/lint",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["exitCode"], 1);
    let violations = json["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1, "shared violation reported once");
    assert_eq!(violations[0]["importer"], "pkg/api");
    assert_eq!(violations[0]["imported"], "internal/db");
    assert_eq!(json["roots"].as_array().unwrap().len(), 2);
}

#[test]
fn recursive_target_pattern() {
    let tmp = repo();
    cmd(tmp.path())
        .args(["check", "--imports", "imports.json", "--format", "compact", "pkg/..."])
        .assert()
        .code(1)
        .stdout(contains("pkg/api imports internal/db"));
}

#[test]
fn targets_from_config_file() {
    let tmp = repo();
    write(
        tmp.path(),
        "import-fence.toml",
        "[checker]\ntargets = [\"internal/db\"]\n",
    );
    cmd(tmp.path())
        .args(["check", "--imports", "imports.json"])
        .assert()
        .code(0);
}

#[test]
fn missing_targets_is_an_error() {
    let tmp = repo();
    cmd(tmp.path())
        .args(["check", "--imports", "imports.json"])
        .assert()
        .code(2)
        .stderr(contains("no targets"));
}

#[test]
fn malformed_rule_file_exits_two() {
    let tmp = repo();
    write(tmp.path(), "cmd/.import-rules.toml", "allowed = \"cmd\"\n");
    cmd(tmp.path())
        .args(["check", "--imports", "imports.json", "internal/db"])
        .assert()
        .code(2)
        .stderr(contains(".import-rules.toml"));
}

#[test]
fn go_sources_are_checked() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "go.mod", "module example.com/repo\n\ngo 1.22\n");
    write(
        tmp.path(),
        "cmd/app/main.go",
        "package main\n\nimport (\n\t\"fmt\"\n\t\"example.com/repo/internal/db\"\n)\n\nfunc main() { fmt.Println(db.Name) }\n",
    );
    write(tmp.path(), "internal/db/db.go", "package db\n\nconst Name = \"db\"\n");
    write(
        tmp.path(),
        "cmd/.import-rules.toml",
        "allowed = [\"cmd\", \"fmt\"]\n",
    );

    cmd(tmp.path())
        .args(["check", "./..."])
        .assert()
        .code(1)
        .stdout(contains("cmd/app\n  rules: cmd\n"))
        .stdout(contains("-> internal/db: no allowed prefix matched"));
}

#[test]
fn explain_shows_merged_rules() {
    let tmp = repo();
    write(
        tmp.path(),
        "pkg/api/.import-rules.toml",
        "allowed = [\"pkg/api\"]\ninherit_from_ancestors = true\n",
    );
    cmd(tmp.path())
        .args(["explain", "pkg/api/v1"])
        .assert()
        .code(0)
        .stdout(contains("rules: pkg/api <- pkg"))
        .stdout(contains("pkg/api  (from pkg/api)"))
        .stdout(contains("internal  (from pkg)"));
}

#[test]
fn explain_without_rules() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path())
        .args(["explain", "anything"])
        .assert()
        .code(0)
        .stdout(contains("every import is allowed"));
}

#[test]
fn init_writes_template_once() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path()).arg("init").assert().code(0);
    assert!(tmp.path().join(".import-rules.toml").is_file());

    cmd(tmp.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(contains("--force"));

    cmd(tmp.path()).args(["init", "--force"]).assert().code(0);
}
