//! Main validation engine.
//!
//! This module provides the `RuleValidator` that builds the typed model,
//! resolves relationship endpoints, and runs every rule area over the result.

use crate::{
    DeprecationValidator, FundamentalsValidator, MetadataValidator, QualityValidator,
    RelationshipValidator, SchemaValidator,
};
use contracts_core::{
    build_contract, BuiltContract, ContractValidator, DiagnosticCode, ExternalReference,
    ValidationContext, ValidationReport, ValidationStats,
};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

/// Main validation engine for data contracts.
///
/// Orchestrates the rule areas and produces an ordered report.
///
/// # Example
///
/// ```rust
/// use contracts_validator::RuleValidator;
/// use contracts_core::ValidationContext;
/// use serde_json::json;
///
/// let document = json!({
///     "apiVersion": "v3.1.0",
///     "kind": "DataContract",
///     "id": "53581432-6c55-4ba2-a65f-72344a91553a",
///     "version": "1.0.0",
///     "status": "active"
/// });
///
/// let report = RuleValidator::new().validate_document(&document, &ValidationContext::new());
///
/// if report.passed {
///     println!("Validation passed!");
/// } else {
///     for diagnostic in report.errors() {
///         println!("Error: {}", diagnostic);
///     }
/// }
/// ```
pub struct RuleValidator {
    validators: Vec<Box<dyn ContractValidator>>,
}

impl RuleValidator {
    /// Creates an engine running every built-in rule area.
    pub fn new() -> Self {
        Self::empty()
            .with_validator(FundamentalsValidator::new())
            .with_validator(SchemaValidator::new())
            .with_validator(RelationshipValidator::new())
            .with_validator(QualityValidator::new())
            .with_validator(MetadataValidator::new())
            .with_validator(DeprecationValidator::new())
    }

    /// Creates an engine with no rule areas.
    pub fn empty() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Adds a rule area.
    pub fn with_validator(mut self, validator: impl ContractValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Names of the registered rule areas, in evaluation order.
    pub fn areas(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Validates a parsed document.
    ///
    /// A document the model cannot be built from yields a report holding
    /// the single structural error; no rule is evaluated in that case.
    pub fn validate_document(&self, document: &Value, context: &ValidationContext) -> ValidationReport {
        let start = Instant::now();

        let built = match build_contract(document) {
            Ok(built) => built,
            Err(diagnostic) => {
                debug!(path = %diagnostic.path, "structural failure, skipping rules");
                return ValidationReport::structural_failure(diagnostic).with_stats(ValidationStats {
                    duration_ms: start.elapsed().as_millis() as u64,
                    ..Default::default()
                });
            }
        };

        let mut report = self.validate_built(&built, context);
        report.stats.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    /// Validates an already built contract.
    pub fn validate_built(&self, built: &BuiltContract, context: &ValidationContext) -> ValidationReport {
        let start = Instant::now();
        let endpoints = built.resolve();

        let mut diagnostics = built.diagnostics.clone();
        debug!(area = "builder", count = diagnostics.len(), "model built");

        // a present value of the wrong type is already reported there
        let mistyped: HashSet<String> = built
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::InvalidType)
            .map(|d| d.path.clone())
            .collect();

        for validator in &self.validators {
            let mut found = validator.validate(&built.contract, &endpoints, context);
            found.retain(|d| d.code != DiagnosticCode::MissingField || !mistyped.contains(&d.path));
            debug!(area = validator.name(), count = found.len(), "rule area evaluated");
            diagnostics.extend(found);
        }

        let mut stats = ValidationStats::of(&built.contract);
        stats.duration_ms = start.elapsed().as_millis() as u64;

        ValidationReport::from_diagnostics(diagnostics)
            .with_external_references(ExternalReference::collect(&endpoints))
            .with_stats(stats)
    }
}

impl Default for RuleValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts_core::{Contract, Diagnostic, ResolvedEndpoint};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct AlwaysWarn;

    impl ContractValidator for AlwaysWarn {
        fn name(&self) -> &'static str {
            "always-warn"
        }

        fn validate(
            &self,
            _contract: &Contract,
            _endpoints: &[ResolvedEndpoint],
            _context: &ValidationContext,
        ) -> Vec<Diagnostic> {
            vec![Diagnostic::warning(
                contracts_core::DiagnosticCode::DeprecatedTeamList,
                "team",
                "custom",
            )]
        }
    }

    #[test]
    fn test_default_areas() {
        assert_eq!(
            RuleValidator::new().areas(),
            vec![
                "fundamentals",
                "schema",
                "relationships",
                "quality",
                "metadata",
                "deprecation"
            ]
        );
    }

    #[test]
    fn test_structural_failure_skips_rules() {
        let report = RuleValidator::new().validate_document(&json!([1, 2]), &ValidationContext::new());
        assert!(!report.passed);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.is_structural_failure());
    }

    #[test]
    fn test_custom_area_warning_keeps_pass() {
        let validator = RuleValidator::empty().with_validator(AlwaysWarn);
        let report = validator.validate_document(&json!({}), &ValidationContext::new());
        assert!(report.passed);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_stats_and_external_references() {
        let report = RuleValidator::new().validate_document(
            &json!({"schema": [{
                "name": "orders", "logicalType": "object",
                "properties": [{"name": "customer_id", "relationships": [{"to": "customers.yaml#customers.id"}]}]
            }]}),
            &ValidationContext::new(),
        );
        assert_eq!(report.stats.schema_objects, 1);
        assert_eq!(report.stats.properties, 1);
        assert_eq!(report.stats.relationships, 1);
        assert_eq!(report.external_references.len(), 1);
        assert_eq!(report.external_references[0].locator, "customers.yaml");
    }

    #[test]
    fn test_mistyped_field_not_also_missing() {
        let report = RuleValidator::new().validate_document(
            &json!({
                "apiVersion": "v3.1.0",
                "kind": "DataContract",
                "id": 123,
                "version": "1.0.0",
                "status": "active"
            }),
            &ValidationContext::new(),
        );
        let at_id: Vec<_> = report.diagnostics.iter().filter(|d| d.path == "id").collect();
        assert_eq!(at_id.len(), 1);
        assert_eq!(at_id[0].code, DiagnosticCode::InvalidType);
    }
}
