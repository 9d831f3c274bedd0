use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

/// Helper to create a Command for the odcs binary
// TODO: Migrate to cargo::cargo_bin_cmd! macro when available
// See: https://github.com/assert-rs/assert_cmd/issues/139
#[allow(deprecated)]
fn odcs() -> Command {
    let mut cmd = Command::cargo_bin("odcs").expect("Failed to find odcs binary");
    cmd.env_remove("ODCS_RULE_CATALOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// validate command tests
// ============================================================================

#[test]
fn test_validate_valid_contract() {
    odcs()
        .arg("validate")
        .arg(fixture_path("valid.odcs.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED"))
        .stdout(predicate::str::contains("regions.odcs.yaml#regions.code"));
}

#[test]
fn test_validate_invalid_contract() {
    odcs()
        .arg("validate")
        .arg(fixture_path("invalid.odcs.yaml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED: 3 error(s), 1 warning(s)"))
        .stdout(predicate::str::contains("[id]"))
        .stdout(predicate::str::contains("[version]"))
        .stdout(predicate::str::contains("[status]"))
        .stdout(predicate::str::contains("object_without_properties"));
}

#[test]
fn test_validate_structural_failure() {
    odcs()
        .arg("validate")
        .arg(fixture_path("structural.odcs.yaml"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("not_a_mapping"));
}

#[test]
fn test_validate_unparseable_file() {
    odcs()
        .arg("validate")
        .arg(fixture_path("broken.odcs.yaml"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("broken.odcs.yaml"));
}

#[test]
fn test_validate_nonexistent_file() {
    odcs()
        .arg("validate")
        .arg("nonexistent.odcs.yaml")
        .assert()
        .code(2);
}

#[test]
fn test_validate_legacy_team_warns_but_passes() {
    odcs()
        .arg("validate")
        .arg(fixture_path("legacy_team.odcs.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("deprecated_team_list"));
}

#[test]
fn test_validate_json_output() {
    let output = odcs()
        .arg("validate")
        .arg(fixture_path("invalid.odcs.yaml"))
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    let file = &json["files"][0];
    assert_eq!(file["status"], "report");
    assert_eq!(file["report"]["passed"], false);

    let paths: Vec<&str> = file["report"]["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["id", "status", "version", "schema[0]"]);
}

#[test]
fn test_validate_directory() {
    let output = odcs()
        .arg("validate")
        .arg(fixture_path("batch"))
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["report"]["passed"], true);
    assert_eq!(files[1]["report"]["passed"], false);
}

#[test]
fn test_validate_with_catalog_override() {
    odcs()
        .arg("validate")
        .arg(fixture_path("published.odcs.json"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[status]"));

    odcs()
        .arg("validate")
        .arg(fixture_path("published.odcs.json"))
        .arg("--catalog")
        .arg(fixture_path("catalog.yaml"))
        .assert()
        .success();
}

#[test]
fn test_validate_catalog_from_environment() {
    odcs()
        .env("ODCS_RULE_CATALOG", fixture_path("catalog.yaml"))
        .arg("validate")
        .arg(fixture_path("published.odcs.json"))
        .assert()
        .success();
}

#[test]
fn test_validate_missing_catalog_is_fatal() {
    odcs()
        .arg("validate")
        .arg(fixture_path("valid.odcs.yaml"))
        .arg("--catalog")
        .arg("missing-catalog.yaml")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rule catalogue"));
}

#[test]
fn test_validate_requires_path() {
    odcs().arg("validate").assert().failure();
}

// ============================================================================
// resolve command tests
// ============================================================================

#[test]
fn test_resolve_shorthand() {
    odcs()
        .arg("resolve")
        .arg(fixture_path("valid.odcs.yaml"))
        .arg("customers.id")
        .assert()
        .success()
        .stdout(predicate::str::contains("shorthand locator"))
        .stdout(predicate::str::contains("Found 'id'"));
}

#[test]
fn test_resolve_fully_qualified_json() {
    let output = odcs()
        .arg("resolve")
        .arg(fixture_path("valid.odcs.yaml"))
        .arg("schema/customers_tbl/properties/customer_pk")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["form"], "fully-qualified");
    assert_eq!(json["resolution"]["status"], "found");
}

#[test]
fn test_resolve_not_found() {
    odcs()
        .arg("resolve")
        .arg(fixture_path("valid.odcs.yaml"))
        .arg("customers.phone")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_resolve_external() {
    odcs()
        .arg("resolve")
        .arg(fixture_path("valid.odcs.yaml"))
        .arg("regions.odcs.yaml#regions.code")
        .assert()
        .success()
        .stdout(predicate::str::contains("external locator"))
        .stdout(predicate::str::contains("not resolved"));
}

// ============================================================================
// init command tests
// ============================================================================

#[test]
fn test_init_full_scaffold_validates() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("orders-daily.odcs.yaml");

    odcs()
        .arg("init")
        .arg(&output)
        .arg("--domain")
        .arg("sales")
        .assert()
        .success()
        .stdout(predicate::str::contains("Contract written to"));

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("name: \"Orders Daily\""));
    assert!(content.contains("domain: \"sales\""));
    assert!(content.contains("id: orders_daily_tbl"));

    odcs().arg("validate").arg(&output).assert().success();
}

#[test]
fn test_init_minimal_scaffold_validates() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("nested").join("events.yaml");

    odcs()
        .arg("init")
        .arg(&output)
        .arg("--minimal")
        .assert()
        .success();

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("- name: events"));
    assert!(!content.contains("domain:"));

    odcs().arg("validate").arg(&output).assert().success();
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("existing.yaml");
    fs::write(&output, "keep me").unwrap();

    odcs()
        .arg("init")
        .arg(&output)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");

    odcs().arg("init").arg(&output).arg("--force").assert().success();
    assert_ne!(fs::read_to_string(&output).unwrap(), "keep me");
}

// ============================================================================
// General CLI tests
// ============================================================================

#[test]
fn test_help_command() {
    odcs()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_command() {
    odcs().arg("--version").assert().success();
}

#[test]
fn test_invalid_command() {
    odcs().arg("invalid-command").assert().failure();
}
