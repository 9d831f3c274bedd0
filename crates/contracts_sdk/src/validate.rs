//! Single-contract validation.

use crate::{external, Result, SdkError};
use contracts_core::{ValidationContext, ValidationReport};
use contracts_parser::{parse_file, parse_str, ContractFormat};
use contracts_validator::RuleValidator;
use std::path::Path;
use tracing::{debug, info};

/// Validates contract text in the given format.
///
/// The text has no location, so external references are listed in the
/// report but never followed.
///
/// # Example
///
/// ```rust
/// use contracts_sdk::{validate_str, ContractFormat, ValidationContext};
///
/// let yaml = r#"
/// apiVersion: v3.1.0
/// kind: DataContract
/// schema:
///   - name: users
///     logicalType: object
/// "#;
///
/// let report = validate_str(yaml, ContractFormat::Yaml, &ValidationContext::new()).unwrap();
/// assert_eq!(report.error_count(), 3);
/// ```
pub fn validate_str(
    content: &str,
    format: ContractFormat,
    context: &ValidationContext,
) -> Result<ValidationReport> {
    let document = parse_str(content, format)?;
    Ok(RuleValidator::new().validate_document(&document, context))
}

/// Loads and validates one contract file.
///
/// With [`ValidationContext::follow_external`] set, file-based external
/// endpoints are loaded relative to the contract's directory and their
/// fragments resolved there.
pub fn validate_file(path: &Path, context: &ValidationContext) -> Result<ValidationReport> {
    let document = parse_file(path).map_err(|source| SdkError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let mut report = RuleValidator::new().validate_document(&document, context);

    if context.follow_external && !report.external_references.is_empty() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        debug!(
            path = %path.display(),
            count = report.external_references.len(),
            "following external references"
        );
        let found = external::follow(&report.external_references, base);
        report.extend(found);
    }

    info!(path = %path.display(), "{}", report.summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts_core::DiagnosticCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_str_scenario() {
        let yaml = "apiVersion: v3.1.0\nkind: DataContract\nschema:\n  - name: users\n    logicalType: object\n";
        let report = validate_str(yaml, ContractFormat::Yaml, &ValidationContext::new()).unwrap();

        assert!(!report.passed);
        let paths: Vec<_> = report.errors().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["id", "status", "version"]);
    }

    #[test]
    fn test_validate_str_non_mapping() {
        let report =
            validate_str("[1, 2, 3]", ContractFormat::Json, &ValidationContext::new()).unwrap();
        assert!(report.is_structural_failure());
        assert_eq!(report.diagnostics[0].code, DiagnosticCode::NotAMapping);
    }

    #[test]
    fn test_validate_str_parse_error() {
        let result = validate_str("{", ContractFormat::Json, &ValidationContext::new());
        assert!(matches!(result.unwrap_err(), SdkError::Parse(_)));
    }

    #[test]
    fn test_validate_missing_file() {
        let result = validate_file(Path::new("missing.odcs.yaml"), &ValidationContext::new());
        assert!(matches!(result.unwrap_err(), SdkError::Load { .. }));
    }
}
