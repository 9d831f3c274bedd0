//! Quality rule declaration checks.
//!
//! Rules are never executed here; only their declaration is validated:
//! - `library`: a known metric and exactly one comparison operator
//! - `sql`: a query and exactly one comparison operator
//! - `custom`: an engine and an implementation, no operators
//! - `text`: a description only
//!
//! Range operators take exactly two numbers, read as inclusive `[low, high]`.

use crate::checks::{check_enum, quality_rules};
use contracts_core::{
    child_path, ComparisonOperator, Contract, ContractValidator, Diagnostic, DiagnosticCode,
    QualityRule, ResolvedEndpoint, RuleCatalog, ValidationContext,
};
use serde_json::Value;

/// Validates quality rule declarations at every level.
pub struct QualityValidator;

impl QualityValidator {
    /// Creates a new quality validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates all quality rules in a contract.
    ///
    /// Returns a list of diagnostics. An empty list indicates success.
    pub fn check(&self, contract: &Contract, catalog: &RuleCatalog) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (path, rule) in quality_rules(contract) {
            self.check_rule(rule, &path, catalog, &mut diagnostics);
        }
        diagnostics
    }

    /// Validates one quality rule.
    pub fn check_rule(
        &self,
        rule: &QualityRule,
        path: &str,
        catalog: &RuleCatalog,
        out: &mut Vec<Diagnostic>,
    ) {
        check_enum(rule.dimension.as_deref(), &catalog.quality_dimensions, path, "dimension", out);
        check_enum(rule.severity.as_deref(), &catalog.quality_severities, path, "severity", out);

        let variant = rule.variant();
        if !catalog.quality_types.contains(variant) {
            check_enum(Some(variant), &catalog.quality_types, path, "type", out);
            return;
        }

        match variant {
            "library" => {
                match (&rule.metric, &rule.rule) {
                    (None, None) => out.push(Diagnostic::missing(child_path(path, "metric"), "metric")),
                    (Some(metric), _) => {
                        check_enum(Some(metric.as_str()), &catalog.library_metrics, path, "metric", out)
                    }
                    (None, Some(legacy)) => {
                        check_enum(Some(legacy.as_str()), &catalog.library_metrics, path, "rule", out)
                    }
                }
                self.forbid(rule, path, variant, &["query", "engine", "implementation"], out);
                self.check_operators(rule, path, out);
            }
            "sql" => {
                if rule.query.is_none() {
                    out.push(Diagnostic::missing(child_path(path, "query"), "query"));
                }
                self.forbid(rule, path, variant, &["metric", "rule", "engine", "implementation"], out);
                self.check_operators(rule, path, out);
            }
            "custom" => {
                if rule.engine.is_none() {
                    out.push(Diagnostic::missing(child_path(path, "engine"), "engine"));
                }
                if rule.implementation.is_none() {
                    out.push(Diagnostic::missing(
                        child_path(path, "implementation"),
                        "implementation",
                    ));
                }
                self.forbid(rule, path, variant, &["metric", "rule", "query"], out);
                self.forbid_operators(rule, path, variant, out);
            }
            "text" => {
                if rule.description.is_none() {
                    out.push(Diagnostic::missing(
                        child_path(path, "description"),
                        "description",
                    ));
                }
                self.forbid(rule, path, variant, &["metric", "rule", "query", "implementation"], out);
                self.forbid_operators(rule, path, variant, out);
            }
            // extra types from a fixture catalogue carry no variant rules
            _ => {}
        }
    }

    /// Exactly one comparison operator, with range operators well formed.
    fn check_operators(&self, rule: &QualityRule, path: &str, out: &mut Vec<Diagnostic>) {
        let comparisons = rule.comparisons();
        if comparisons.len() != 1 {
            let keys: Vec<&str> = comparisons.iter().map(|(op, _)| op.key()).collect();
            out.push(Diagnostic::field(
                DiagnosticCode::QualityOperatorCount,
                path,
                format!(
                    "exactly one comparison operator must be set, found {} [{}]",
                    comparisons.len(),
                    keys.join(", ")
                ),
            ));
        }

        for (op, value) in comparisons {
            if op.is_range() {
                self.check_range(op, value, path, out);
            }
        }
    }

    fn check_range(&self, op: ComparisonOperator, value: &Value, path: &str, out: &mut Vec<Diagnostic>) {
        let key_path = child_path(path, op.key());
        let bounds = match value.as_array() {
            Some(values) if values.len() == 2 => values,
            _ => {
                out.push(Diagnostic::field(
                    DiagnosticCode::BetweenArity,
                    key_path,
                    "between operator requires exactly two values",
                ));
                return;
            }
        };

        let (Some(low), Some(high)) = (bounds[0].as_f64(), bounds[1].as_f64()) else {
            out.push(Diagnostic::field(
                DiagnosticCode::BetweenArity,
                key_path,
                "between operator requires two numeric values",
            ));
            return;
        };

        if low > high {
            out.push(Diagnostic::warning(
                DiagnosticCode::BetweenBoundsReversed,
                key_path,
                format!("lower bound {low} is greater than upper bound {high}; the range is empty"),
            ));
        }
    }

    fn forbid(
        &self,
        rule: &QualityRule,
        path: &str,
        variant: &str,
        keys: &[&str],
        out: &mut Vec<Diagnostic>,
    ) {
        for key in keys {
            let present = match *key {
                "metric" => rule.metric.is_some(),
                "rule" => rule.rule.is_some(),
                "query" => rule.query.is_some(),
                "engine" => rule.engine.is_some(),
                "implementation" => rule.implementation.is_some(),
                _ => false,
            };
            if present {
                out.push(conflict(path, key, variant));
            }
        }
    }

    fn forbid_operators(&self, rule: &QualityRule, path: &str, variant: &str, out: &mut Vec<Diagnostic>) {
        for (op, _) in rule.comparisons() {
            out.push(conflict(path, op.key(), variant));
        }
    }
}

fn conflict(path: &str, key: &str, variant: &str) -> Diagnostic {
    Diagnostic::field(
        DiagnosticCode::QualityVariantConflict,
        child_path(path, key),
        format!("'{key}' is not allowed in a '{variant}' quality rule"),
    )
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractValidator for QualityValidator {
    fn name(&self) -> &'static str {
        "quality"
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
