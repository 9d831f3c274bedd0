//! Deprecation warnings.
//!
//! Legacy shapes are accepted and normalized by the builder; this area
//! only points authors at their current replacements. Nothing reported
//! here affects the verdict.

use crate::checks::quality_rules;
use contracts_core::{
    child_path, Contract, ContractValidator, Diagnostic, DiagnosticCode, ResolvedEndpoint,
    ValidationContext,
};

/// Reports usage of deprecated fields and structures.
pub struct DeprecationValidator;

impl DeprecationValidator {
    /// Creates a new deprecation validator.
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, contract: &Contract) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if contract.team.as_ref().is_some_and(|team| team.legacy_list) {
            diagnostics.push(Diagnostic::warning(
                DiagnosticCode::DeprecatedTeamList,
                "team",
                "team as a list of members is deprecated; use a team object with 'members'",
            ));
        }

        if contract.sla_default_element.is_some() {
            diagnostics.push(Diagnostic::warning(
                DiagnosticCode::DeprecatedSlaDefaultElement,
                "slaDefaultElement",
                "'slaDefaultElement' is deprecated; set 'element' on each entry of 'slaProperties'",
            ));
        }

        for (path, rule) in quality_rules(contract) {
            if rule.rule.is_some() {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticCode::DeprecatedQualityRuleField,
                    child_path(&path, "rule"),
                    "quality field 'rule' is deprecated; use 'metric'",
                ));
            }
        }

        diagnostics
    }
}

impl Default for DeprecationValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractValidator for DeprecationValidator {
    fn name(&self) -> &'static str {
        "deprecation"
    }

    fn validate(
        &self,
        contract: &Contract,
        _endpoints: &[ResolvedEndpoint],
        _context: &ValidationContext,
    ) -> Vec<Diagnostic> {
        self.check(contract)
    }
}
