//! Batch validation and external reference following over real files.

use contracts_sdk::{
    validate_file, validate_paths, DiagnosticCode, DiagnosticKind, FileOutcome, ValidationContext,
    EXIT_FAILED, EXIT_FATAL, EXIT_PASSED,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

const VALID: &str = r#"
apiVersion: v3.1.0
kind: DataContract
id: 53581432-6c55-4ba2-a65f-72344a91553a
version: 1.0.0
status: active
schema:
  - name: orders
    logicalType: object
    properties:
      - name: order_id
        logicalType: string
        primaryKey: true
"#;

const MISSING_ID: &str = r#"
apiVersion: v3.1.0
kind: DataContract
version: 1.0.0
status: active
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn statuses(outcomes: &[contracts_sdk::FileResult]) -> Vec<&'static str> {
    outcomes
        .iter()
        .map(|file| match &file.outcome {
            FileOutcome::Report { report } if report.passed => "passed",
            FileOutcome::Report { .. } => "failed",
            FileOutcome::LoadError { .. } => "load_error",
            FileOutcome::Skipped => "skipped",
        })
        .collect()
}

#[tokio::test]
async fn test_directory_batch() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a_valid.yaml", VALID);
    write(dir.path(), "b_missing_id.yaml", MISSING_ID);
    write(dir.path(), "README.md", "# not a contract");

    let batch = validate_paths(&[dir.path().to_path_buf()], &ValidationContext::new())
        .await
        .unwrap();

    assert_eq!(statuses(&batch.files), vec!["passed", "failed"]);
    assert_eq!(batch.exit_code(), EXIT_FAILED);
}

#[tokio::test]
async fn test_structural_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let list = write(dir.path(), "list.yaml", "- not\n- a mapping\n");

    let batch = validate_paths(&[list], &ValidationContext::new()).await.unwrap();
    assert_eq!(statuses(&batch.files), vec!["failed"]);
    assert_eq!(batch.exit_code(), EXIT_FATAL);
}

#[tokio::test]
async fn test_load_failure_skips_pending_files() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(dir.path(), "a_broken.yaml", "schema: [unclosed\n");
    let first = write(dir.path(), "b.yaml", VALID);
    let second = write(dir.path(), "c.yaml", VALID);

    let context = ValidationContext::new().with_max_concurrency(1);
    let batch = validate_paths(&[broken, first, second], &context).await.unwrap();

    assert_eq!(
        statuses(&batch.files),
        vec!["load_error", "skipped", "skipped"]
    );
    assert_eq!(batch.skipped(), 2);
    assert_eq!(batch.exit_code(), EXIT_FATAL);
}

#[tokio::test]
async fn test_all_passing() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write(dir.path(), "one.yaml", VALID),
        write(dir.path(), "two.json", &serde_json::to_string(&serde_json::json!({
            "apiVersion": "v3.1.0",
            "kind": "DataContract",
            "id": "0b6b9f5e-3f55-4d0a-9a4e-2c1f0f6f1e2d",
            "version": "2.1.0",
            "status": "draft"
        })).unwrap()),
    ];

    let batch = validate_paths(&files, &ValidationContext::new()).await.unwrap();
    assert!(batch.passed());
    assert_eq!(batch.exit_code(), EXIT_PASSED);
}

#[test]
fn test_follow_external_references() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "customers.yaml",
        "schema:\n  - name: customers\n    logicalType: object\n    properties:\n      - name: id\n        logicalType: string\n",
    );
    let orders = write(
        dir.path(),
        "orders.yaml",
        &format!(
            "{VALID}        relationships:\n          - to: customers.yaml#customers.id\n      - name: email\n        logicalType: string\n        relationships:\n          - to: customers.yaml#customers.email\n      - name: region\n        logicalType: string\n        relationships:\n          - to: regions.yaml#regions.code\n"
        ),
    );

    let unfollowed = validate_file(&orders, &ValidationContext::new()).unwrap();
    assert!(unfollowed.passed, "{unfollowed}");
    assert_eq!(unfollowed.external_references.len(), 3);

    let followed =
        validate_file(&orders, &ValidationContext::new().with_follow_external(true)).unwrap();
    assert!(!followed.passed);

    let found: Vec<_> = followed
        .diagnostics
        .iter()
        .map(|d| (d.kind, d.code, d.path.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (
                DiagnosticKind::Reference,
                DiagnosticCode::UnresolvedReference,
                "schema[0].properties[1].relationships[0].to"
            ),
            (
                DiagnosticKind::Warning,
                DiagnosticCode::ExternalReferenceUnavailable,
                "schema[0].properties[2].relationships[0].to"
            ),
        ]
    );
}
