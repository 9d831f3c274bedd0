//! Relationship validation.
//!
//! Reports placement and endpoint-shape problems of every declared
//! relationship, and a reference error for every endpoint that stays
//! unresolved inside the document. External endpoints are never errors.

use contracts_core::{
    declared_relationships, placement_diagnostics, Contract, ContractValidator, Diagnostic,
    Resolution, ResolvedEndpoint, ValidationContext,
};

/// Validates relationships and their resolved endpoints.
pub struct RelationshipValidator;

impl RelationshipValidator {
    /// Creates a new relationship validator.
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, contract: &Contract, endpoints: &[ResolvedEndpoint]) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = declared_relationships(contract)
            .into_iter()
            .flat_map(|(path, level, relationship)| {
                placement_diagnostics(relationship, level, &path)
            })
            .collect();

        for endpoint in endpoints {
            if let Resolution::NotFoundLocal { reason } = &endpoint.resolution {
                diagnostics.push(Diagnostic::reference(
                    endpoint.path.clone(),
                    format!("endpoint '{}' does not resolve: {reason}", endpoint.endpoint),
                ));
            }
        }

        diagnostics
    }
}

impl Default for RelationshipValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractValidator for RelationshipValidator {
    fn name(&self) -> &'static str {
        "relationships"
    }

    fn validate(
        &self,
        contract: &Contract,
        endpoints: &[ResolvedEndpoint],
        _context: &ValidationContext,
    ) -> Vec<Diagnostic> {
        self.check(contract, endpoints)
    }
}
