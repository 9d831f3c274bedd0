//! Fundamentals validation.
//!
//! Checks the identifying fields every contract carries at its root:
//! `apiVersion`, `kind`, `id`, `version` and `status`.

use crate::checks::{check_enum, require};
use contracts_core::{
    Contract, ContractValidator, Diagnostic, DiagnosticCode, ResolvedEndpoint, RuleCatalog,
    ValidationContext,
};

/// Validates the root fundamentals of a contract.
pub struct FundamentalsValidator;

impl FundamentalsValidator {
    /// Creates a new fundamentals validator.
    pub fn new() -> Self {
        Self
    }

    /// Returns one diagnostic per missing or malformed field.
    pub fn check(&self, contract: &Contract, catalog: &RuleCatalog) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        require(&contract.api_version, "", "apiVersion", &mut diagnostics);
        check_enum(
            contract.api_version.as_deref(),
            &catalog.api_versions,
            "",
            "apiVersion",
            &mut diagnostics,
        );

        require(&contract.kind, "", "kind", &mut diagnostics);
        check_enum(
            contract.kind.as_deref(),
            &catalog.kinds,
            "",
            "kind",
            &mut diagnostics,
        );

        require(&contract.id, "", "id", &mut diagnostics);
        if let Some(id) = &contract.id {
            if !catalog.id_pattern.is_match(id) {
                diagnostics.push(Diagnostic::field(
                    DiagnosticCode::PatternMismatch,
                    "id",
                    format!("id '{id}' is not a UUID"),
                ));
            }
        }

        require(&contract.version, "", "version", &mut diagnostics);
        if let Some(version) = &contract.version {
            if !catalog.version_pattern.is_match(version) {
                diagnostics.push(Diagnostic::field(
                    DiagnosticCode::PatternMismatch,
                    "version",
                    format!("version '{version}' is not a semantic version (MAJOR.MINOR.PATCH)"),
                ));
            }
        }

        require(&contract.status, "", "status", &mut diagnostics);
        check_enum(
            contract.status.as_deref(),
            &catalog.statuses,
            "",
            "status",
            &mut diagnostics,
        );

        diagnostics
    }
}

impl Default for FundamentalsValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractValidator for FundamentalsValidator {
    fn name(&self) -> &'static str {
        "fundamentals"
    }

    fn validate(
        &self,
        contract: &Contract,
        _endpoints: &[ResolvedEndpoint],
        context: &ValidationContext,
    ) -> Vec<Diagnostic> {
        self.check(contract, &context.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contract() -> Contract {
        Contract {
            api_version: Some("v3.1.0".to_string()),
            kind: Some("DataContract".to_string()),
            id: Some("53581432-6c55-4ba2-a65f-72344a91553a".to_string()),
            version: Some("1.0.0".to_string()),
            status: Some("active".to_string()),
            ..Default::default()
        }
    }

    fn paths(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn test_valid_fundamentals() {
        let diagnostics = FundamentalsValidator::new().check(&contract(), &RuleCatalog::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_one_diagnostic_per_missing_field() {
        let contract = Contract {
            id: None,
            version: None,
            status: None,
            ..contract()
        };
        let diagnostics = FundamentalsValidator::new().check(&contract, &RuleCatalog::default());
        assert_eq!(paths(&diagnostics), vec!["id", "version", "status"]);
        assert!(diagnostics
            .iter()
            .all(|d| d.code == DiagnosticCode::MissingField));
    }

    #[test]
    fn test_malformed_values() {
        let contract = Contract {
            api_version: Some("v2.2.2".to_string()),
            id: Some("orders".to_string()),
            version: Some("1.0".to_string()),
            status: Some("published".to_string()),
            ..contract()
        };
        let diagnostics = FundamentalsValidator::new().check(&contract, &RuleCatalog::default());
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::InvalidValue,
                DiagnosticCode::PatternMismatch,
                DiagnosticCode::PatternMismatch,
                DiagnosticCode::InvalidValue,
            ]
        );
    }

    #[test]
    fn test_fixture_catalog() {
        let mut catalog = RuleCatalog::default();
        catalog.statuses.insert("published".to_string());
        let contract = Contract {
            status: Some("published".to_string()),
            ..contract()
        };
        assert!(FundamentalsValidator::new()
            .check(&contract, &catalog)
            .is_empty());
    }
}
