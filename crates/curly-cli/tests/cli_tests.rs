//! Integration tests for the curly CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const CLEAN: &str = "class A\n{\n    int x;\n}\n";
const MESSY: &str = "class B\n{\n\n    int x;\n}\n";

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("curly").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    // Keep discovery from walking into configuration above the temp dir
    fs::write(temp_dir.path().join(".curlyrc.json"), "{ \"root\": true }").unwrap();
    for (name, content) in files {
        fs::write(temp_dir.path().join(name), content).unwrap();
    }
    temp_dir
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("curly checks where braces"))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_lint_clean_project() {
    let dir = project(&[("A.cs", CLEAN)]);
    cli()
        .current_dir(dir.path())
        .arg("lint")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"))
        .stdout(predicate::str::contains("Files checked: 1"));
}

#[test]
fn test_lint_reports_diagnostics() {
    let dir = project(&[("B.cs", MESSY)]);
    cli()
        .current_dir(dir.path())
        .args(["lint", "B.cs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning[SA1505]"))
        .stdout(predicate::str::contains("B.cs:3:1"))
        .stdout(predicate::str::contains("Warnings: 1"));
}

#[test]
fn test_error_on_warnings() {
    let dir = project(&[("B.cs", MESSY)]);
    cli()
        .current_dir(dir.path())
        .args(["lint", "--error-on-warnings", "B.cs"])
        .assert()
        .code(1);
}

#[test]
fn test_lint_fix_writes_file() {
    let dir = project(&[("B.cs", MESSY)]);
    cli()
        .current_dir(dir.path())
        .args(["lint", "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixes applied: 1 in 1 file"));

    let fixed = fs::read_to_string(dir.path().join("B.cs")).unwrap();
    assert_eq!(fixed, "class B\n{\n    int x;\n}\n");
}

#[test]
fn test_lint_diff_leaves_file_alone() {
    let dir = project(&[("B.cs", MESSY)]);
    cli()
        .current_dir(dir.path())
        .args(["lint", "--diff", "B.cs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+++ B.cs (fixed)"))
        .stdout(predicate::str::contains("@@ -1,5 +1,4 @@"))
        .stdout(predicate::str::contains("Fixes available: 1"));

    let content = fs::read_to_string(dir.path().join("B.cs")).unwrap();
    assert_eq!(content, MESSY);
}

#[test]
fn test_fix_and_diff_conflict() {
    cli().args(["lint", "--fix", "--diff"]).assert().failure();
}

#[test]
fn test_json_output() {
    let dir = project(&[("B.cs", MESSY)]);
    let output = cli()
        .current_dir(dir.path())
        .args(["lint", "--format", "json", "B.cs"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["files_checked"], 1);
    assert_eq!(json["issues"][0]["ruleId"], "SA1505");
    assert_eq!(json["issues"][0]["fixable"], true);
    assert_eq!(json["summary"]["warnings"], 1);
}

#[test]
fn test_github_output() {
    let dir = project(&[("B.cs", MESSY)]);
    cli()
        .current_dir(dir.path())
        .args(["lint", "--format", "github", "B.cs"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("::warning file=B.cs,line=3,col=1"))
        .stdout(predicate::str::contains("(SA1505)"));
}

#[test]
fn test_config_disables_rule() {
    let dir = project(&[("B.cs", MESSY)]);
    fs::write(
        dir.path().join(".curlyrc.json"),
        r#"{
            // blank lines after braces are fine here
            "root": true,
            "linter": { "rules": { "SA1505": "off" } }
        }"#,
    )
    .unwrap();
    cli()
        .current_dir(dir.path())
        .arg("lint")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_config_error_severity_fails() {
    let dir = project(&[("B.cs", MESSY)]);
    let config = dir.path().join("strict.toml");
    fs::write(&config, "[linter.rules]\nSA1505 = \"error\"\n").unwrap();
    cli()
        .current_dir(dir.path())
        .args(["lint", "--config", "strict.toml", "B.cs"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error[SA1505]"));
}

#[test]
fn test_missing_path() {
    let dir = project(&[]);
    cli()
        .current_dir(dir.path())
        .args(["lint", "Missing.cs"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing.cs"));
}

#[test]
fn test_rules_command() {
    cli()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("SA1500"))
        .stdout(predicate::str::contains("SA1520"))
        .stdout(predicate::str::contains("Total: 21 rules"));
}

#[test]
fn test_explain_command() {
    cli()
        .args(["explain", "sa1500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule: SA1500"))
        .stdout(predicate::str::contains("SA1501 (single line statement block)"));

    cli()
        .args(["explain", "SA1501"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Takes precedence over: SA1500"));
}

#[test]
fn test_explain_unknown_rule() {
    cli()
        .args(["explain", "SA9999"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn test_config_init() {
    let dir = TempDir::new().unwrap();
    cli()
        .current_dir(dir.path())
        .args(["config", "init"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join(".curlyrc.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["layout"]["newlineAtEndOfFile"], "allow");

    cli()
        .current_dir(dir.path())
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    cli()
        .current_dir(dir.path())
        .args(["config", "init", "--force", "--format", "toml"])
        .assert()
        .success();
    assert!(dir.path().join(".curlyrc.toml").exists());
}

#[test]
fn test_config_schema() {
    let output = cli().args(["config", "schema"]).output().unwrap();
    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(schema["properties"]["linter"].is_object());
}
