//! Validation traits and types for data contracts.
//!
//! This module defines the seam rule validators plug into
//! ([`ContractValidator`]), the options a validation pass runs with
//! ([`ValidationContext`]), and the ordered outcome ([`ValidationReport`]).

use crate::{
    Contract, Diagnostic, DiagnosticKind, Resolution, ResolvedEndpoint, RuleCatalog, Severity,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Core trait for one area of the rule catalogue.
///
/// Implementations are pure: they read the contract and the resolved
/// relationship endpoints and return diagnostics, in any order.
///
/// # Example
///
/// ```rust
/// use contracts_core::{
///     Contract, ContractValidator, Diagnostic, ResolvedEndpoint, ValidationContext,
/// };
///
/// struct NameRequired;
///
/// impl ContractValidator for NameRequired {
///     fn name(&self) -> &'static str {
///         "name"
///     }
///
///     fn validate(
///         &self,
///         contract: &Contract,
///         _endpoints: &[ResolvedEndpoint],
///         _context: &ValidationContext,
///     ) -> Vec<Diagnostic> {
///         match contract.name {
///             Some(_) => Vec::new(),
///             None => vec![Diagnostic::missing("name", "name")],
///         }
///     }
/// }
/// ```
pub trait ContractValidator: Send + Sync {
    /// Short name of the rule area, used in logs.
    fn name(&self) -> &'static str;

    /// Evaluates the rule area.
    fn validate(
        &self,
        contract: &Contract,
        endpoints: &[ResolvedEndpoint],
        context: &ValidationContext,
    ) -> Vec<Diagnostic>;
}

/// Context for validation operations.
///
/// Carries the rule catalogue plus the options used by the batch and
/// external-reference layers.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Enumerated sets and patterns the rules check against
    pub catalog: Arc<RuleCatalog>,

    /// Whether file-based external references are loaded and resolved
    pub follow_external: bool,

    /// Maximum number of contracts validated at the same time
    pub max_concurrency: usize,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            catalog: Arc::new(RuleCatalog::default()),
            follow_external: false,
            max_concurrency: 4,
        }
    }
}

impl ValidationContext {
    /// Creates a new validation context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rule catalogue.
    pub fn with_catalog(mut self, catalog: RuleCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Enables or disables following of external file references.
    pub fn with_follow_external(mut self, follow: bool) -> Self {
        self.follow_external = follow;
        self
    }

    /// Sets the batch concurrency limit (at least 1).
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }
}

/// A relationship endpoint that points into another document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalReference {
    /// Document path of the endpoint string
    pub path: String,
    pub locator: String,
    pub fragment: String,
}

impl ExternalReference {
    /// Collects the external endpoints of a resolution pass.
    pub fn collect(endpoints: &[ResolvedEndpoint]) -> Vec<Self> {
        endpoints
            .iter()
            .filter_map(|endpoint| match &endpoint.resolution {
                Resolution::ExternalUnresolved { locator, fragment } => Some(Self {
                    path: endpoint.path.clone(),
                    locator: locator.clone(),
                    fragment: fragment.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Report of validation results.
///
/// Diagnostics are kept ordered: errors before warnings, then by path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Whether validation passed overall
    pub passed: bool,

    /// Ordered findings
    pub diagnostics: Vec<Diagnostic>,

    /// Endpoints deferred to other documents
    pub external_references: Vec<ExternalReference>,

    /// Validation statistics
    pub stats: ValidationStats,
}

/// Statistics about validation execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    /// Number of schema objects in the contract
    pub schema_objects: usize,

    /// Number of properties, nested ones included
    pub properties: usize,

    /// Number of relationships at schema and property level
    pub relationships: usize,

    /// Number of quality rules at every level
    pub quality_rules: usize,

    /// Validation duration in milliseconds
    pub duration_ms: u64,
}

impl ValidationStats {
    /// Counts the entities of a contract.
    pub fn of(contract: &Contract) -> Self {
        let properties = contract.properties();
        let objects = contract.schema_objects();

        let relationships = objects.iter().map(|o| o.relationships().len()).sum::<usize>()
            + properties
                .iter()
                .map(|p| p.property.relationships().len())
                .sum::<usize>();

        let quality_len = |rules: &Option<Vec<crate::QualityRule>>| rules.as_ref().map_or(0, Vec::len);
        let quality_rules = quality_len(&contract.quality)
            + objects.iter().map(|o| quality_len(&o.quality)).sum::<usize>()
            + properties
                .iter()
                .map(|p| quality_len(&p.property.quality))
                .sum::<usize>();

        Self {
            schema_objects: objects.len(),
            properties: properties.len(),
            relationships,
            quality_rules,
            duration_ms: 0,
        }
    }
}

impl ValidationReport {
    /// Creates a report from unordered diagnostics.
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let mut report = Self::default();
        report.extend(diagnostics);
        report
    }

    /// Creates the report of a contract that could not be built at all.
    pub fn structural_failure(diagnostic: Diagnostic) -> Self {
        Self::from_diagnostics(vec![diagnostic])
    }

    pub fn with_external_references(mut self, references: Vec<ExternalReference>) -> Self {
        self.external_references = references;
        self
    }

    pub fn with_stats(mut self, stats: ValidationStats) -> Self {
        self.stats = stats;
        self
    }

    /// Adds diagnostics, keeping the order and the verdict consistent.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
        // stable: equal (severity, path) keep their evaluation order
        self.diagnostics
            .sort_by(|a, b| (a.severity, &a.path).cmp(&(b.severity, &b.path)));
        self.passed = !self.diagnostics.iter().any(Diagnostic::is_error);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Whether the contract failed on a structural error, i.e. no model exists.
    pub fn is_structural_failure(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Structural)
    }

    /// One-line verdict.
    pub fn summary(&self) -> String {
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        format!(
            "{verdict}: {} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{diagnostic}")?;
        }
        write!(f, "{}", self.summary())
    }
}

/// Upper-case label used by terminal output.
pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARNING",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiagnosticCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_orders_errors_first_then_path() {
        let report = ValidationReport::from_diagnostics(vec![
            Diagnostic::warning(DiagnosticCode::DeprecatedTeamList, "team", "legacy"),
            Diagnostic::missing("version", "version"),
            Diagnostic::missing("id", "id"),
            Diagnostic::warning(DiagnosticCode::DeprecatedSlaDefaultElement, "slaDefaultElement", "moved"),
        ]);

        let order: Vec<_> = report.diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(order, vec!["id", "version", "slaDefaultElement", "team"]);
        assert!(!report.passed);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.summary(), "FAILED: 2 error(s), 2 warning(s)");
    }

    #[test]
    fn test_warnings_never_fail() {
        let report = ValidationReport::from_diagnostics(vec![Diagnostic::warning(
            DiagnosticCode::DeprecatedQualityRuleField,
            "quality[0].rule",
            "renamed",
        )]);
        assert!(report.passed);
        assert!(!report.is_structural_failure());
    }

    #[test]
    fn test_structural_failure() {
        let report = ValidationReport::structural_failure(Diagnostic::structural(
            DiagnosticCode::NotAMapping,
            "",
            "not a mapping",
        ));
        assert!(!report.passed);
        assert!(report.is_structural_failure());
    }

    #[test]
    fn test_context_builder() {
        let context = ValidationContext::new()
            .with_follow_external(true)
            .with_max_concurrency(0);
        assert!(context.follow_external);
        assert_eq!(context.max_concurrency, 1);
    }
}
