//! End-to-end rule evaluation over whole documents.

use contracts_core::{
    build_contract, DiagnosticCode, DiagnosticKind, Resolution, RuleCatalog, ValidationContext,
    ValidationReport,
};
use contracts_validator::RuleValidator;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn validate(document: &Value) -> ValidationReport {
    RuleValidator::new().validate_document(document, &ValidationContext::new())
}

fn minimal() -> Value {
    json!({
        "apiVersion": "v3.1.0",
        "kind": "DataContract",
        "id": "53581432-6c55-4ba2-a65f-72344a91553a",
        "version": "1.0.0",
        "status": "active",
        "schema": [{
            "name": "orders",
            "logicalType": "object",
            "properties": [
                {"name": "order_id", "logicalType": "string", "primaryKey": true}
            ]
        }]
    })
}

fn with(mut document: Value, key: &str, value: Value) -> Value {
    document[key] = value;
    document
}

fn error_codes(report: &ValidationReport) -> Vec<DiagnosticCode> {
    report.errors().map(|d| d.code).collect()
}

#[test]
fn test_minimal_contract_has_no_errors() {
    let report = validate(&minimal());
    assert!(report.passed, "{report}");
    assert_eq!(report.error_count(), 0);
}

#[test]
fn test_schema_object_without_properties_reports_three_missing_fields() {
    let report = validate(&json!({
        "apiVersion": "v3.1.0",
        "kind": "DataContract",
        "schema": [{"name": "users", "logicalType": "object"}]
    }));

    assert!(!report.passed);
    let errors: Vec<_> = report
        .errors()
        .map(|d| (d.kind, d.code, d.path.as_str()))
        .collect();
    assert_eq!(
        errors,
        vec![
            (DiagnosticKind::Field, DiagnosticCode::MissingField, "id"),
            (DiagnosticKind::Field, DiagnosticCode::MissingField, "status"),
            (DiagnosticKind::Field, DiagnosticCode::MissingField, "version"),
        ]
    );
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn test_every_missing_subset_reports_each_field() {
    let fields = ["id", "version", "status"];
    for mask in 1..(1 << fields.len()) {
        let mut document = minimal();
        let missing: Vec<&str> = fields
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, field)| *field)
            .collect();
        for field in &missing {
            document.as_object_mut().unwrap().remove(*field);
        }

        let report = validate(&document);
        for field in &missing {
            assert_eq!(
                report.errors().filter(|d| d.path == *field).count(),
                1,
                "missing {missing:?}"
            );
        }
        assert!(report.error_count() >= missing.len());
    }
}

#[test]
fn test_between_with_one_value() {
    let report = validate(&with(
        minimal(),
        "quality",
        json!([{"type": "library", "metric": "rowCount", "mustBeBetween": [5], "dimension": "completeness"}]),
    ));

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "between operator requires exactly two values");
}

fn schema_relationship(relationship: Value) -> Value {
    let mut document = minimal();
    document["schema"][0]["properties"] = json!([
        {"name": "a", "logicalType": "string"},
        {"name": "b", "logicalType": "string"},
        {"name": "c", "logicalType": "string"}
    ]);
    document["schema"][0]["relationships"] = json!([relationship]);
    document
}

#[test]
fn test_composite_length_mismatch() {
    let report = validate(&schema_relationship(json!({"from": ["a", "b"], "to": ["c"]})));
    assert_eq!(error_codes(&report), vec![DiagnosticCode::EndpointLengthMismatch]);
    assert!(report.errors().next().unwrap().message.contains("2"));
}

#[test]
fn test_single_against_composite() {
    for relationship in [
        json!({"from": "orders.a", "to": ["orders.b", "orders.c"]}),
        json!({"from": ["orders.a", "orders.b"], "to": "orders.c"}),
    ] {
        let report = validate(&schema_relationship(relationship));
        assert_eq!(error_codes(&report), vec![DiagnosticCode::EndpointShapeMismatch]);
    }
}

#[test]
fn test_property_level_source_is_one_error() {
    let mut document = minimal();
    document["schema"][0]["properties"][0]["relationships"] =
        json!([{"from": "orders.order_id", "to": ["x.y", "z.w"]}]);

    let report = validate(&document);
    assert_eq!(
        error_codes(&report),
        vec![DiagnosticCode::FromNotAllowedAtPropertyLevel]
    );
}

#[test]
fn test_external_endpoint_is_deferred() {
    let mut document = minimal();
    document["schema"][0]["properties"][0]["relationships"] =
        json!([{"to": "other-contract.yaml#customers.id"}]);

    let built = build_contract(&document).unwrap();
    assert_eq!(
        built.resolve()[0].resolution,
        Resolution::ExternalUnresolved {
            locator: "other-contract.yaml".to_string(),
            fragment: "customers.id".to_string(),
        }
    );

    let report = validate(&document);
    assert!(report.passed, "{report}");
    assert_eq!(report.external_references.len(), 1);
}

#[test]
fn test_primary_key_positions() {
    let keyed = |first: i64, second: i64| {
        let mut document = minimal();
        document["schema"][0]["properties"] = json!([
            {"name": "a", "logicalType": "string", "primaryKey": true, "primaryKeyPosition": first},
            {"name": "b", "logicalType": "string", "primaryKey": true, "primaryKeyPosition": second}
        ]);
        validate(&document)
    };

    assert!(keyed(1, 2).passed);
    assert!(keyed(2, 1).passed);
    assert_eq!(
        error_codes(&keyed(1, 1)),
        vec![DiagnosticCode::InvalidPrimaryKeyPositions]
    );
    assert_eq!(
        error_codes(&keyed(1, 3)),
        vec![DiagnosticCode::InvalidPrimaryKeyPositions]
    );
}

#[test]
fn test_local_references_resolve() {
    let document = with(
        minimal(),
        "schema",
        json!([
            {"name": "customers", "id": "customers_tbl", "logicalType": "object",
             "properties": [{"name": "id", "id": "customer_pk", "logicalType": "string"}]},
            {"name": "orders", "logicalType": "object",
             "properties": [
                {"name": "customer_id", "logicalType": "string",
                 "relationships": [
                    {"to": "customers.id"},
                    {"to": "schema/customers_tbl/properties/customer_pk"}
                 ]},
                {"name": "broken", "logicalType": "string",
                 "relationships": [{"to": "customers.nope"}]}
             ]}
        ]),
    );

    let report = validate(&document);
    let references: Vec<_> = report
        .errors()
        .filter(|d| d.kind == DiagnosticKind::Reference)
        .map(|d| d.path.as_str())
        .collect();
    assert_eq!(references, vec!["schema[1].properties[1].relationships[0].to"]);
}

#[test]
fn test_legacy_team_warns_without_failing() {
    let document = with(minimal(), "team", json!([{"username": "ceastwood", "role": "owner"}]));
    let before = document.clone();

    let report = validate(&document);
    assert!(report.passed, "{report}");
    assert_eq!(report.warnings().next().unwrap().code, DiagnosticCode::DeprecatedTeamList);
    assert_eq!(document, before);
}

#[test]
fn test_model_rederives_document() {
    let document = with(
        minimal(),
        "x-owner-note",
        json!({"kept": true, "nested": [1, 2, 3]}),
    );
    let built = build_contract(&document).unwrap();
    assert_eq!(built.contract.to_document().unwrap(), document);
}

#[test]
fn test_fixture_catalog_changes_verdict() {
    let document = with(minimal(), "status", json!("published"));
    assert!(!validate(&document).passed);

    let mut catalog = RuleCatalog::default();
    catalog.statuses.insert("published".to_string());
    let context = ValidationContext::new().with_catalog(catalog);
    assert!(RuleValidator::new().validate_document(&document, &context).passed);
}

#[test]
fn test_report_order() {
    let report = validate(&json!({
        "team": [{"username": "a"}],
        "kind": "DataContract",
        "apiVersion": "v3.1.0"
    }));
    let paths: Vec<_> = report.diagnostics.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["id", "status", "version", "team"]);
}
