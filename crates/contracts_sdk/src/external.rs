//! Following of external relationship endpoints.
//!
//! Only file locators are followed. Each referenced document is loaded and
//! built once per call; URLs are never fetched.

use contracts_core::{
    build_contract, BuiltContract, Diagnostic, DiagnosticCode, ExternalReference, Resolution,
};
use contracts_parser::parse_file;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Whether a locator names a remote resource rather than a file.
pub fn is_url(locator: &str) -> bool {
    locator.contains("://")
}

/// Resolves file-based external references relative to `base`.
///
/// Returns a reference error for every fragment missing from its target and
/// a warning for every target that cannot be loaded.
pub fn follow(references: &[ExternalReference], base: &Path) -> Vec<Diagnostic> {
    let mut loaded: HashMap<&str, Result<BuiltContract, String>> = HashMap::new();
    let mut diagnostics = Vec::new();

    for reference in references {
        if is_url(&reference.locator) {
            continue;
        }

        let target = loaded
            .entry(reference.locator.as_str())
            .or_insert_with(|| load(&base.join(&reference.locator)));

        match target {
            Err(message) => diagnostics.push(Diagnostic::warning(
                DiagnosticCode::ExternalReferenceUnavailable,
                reference.path.clone(),
                format!(
                    "external contract '{}' could not be loaded: {message}",
                    reference.locator
                ),
            )),
            Ok(built) => {
                if let Resolution::NotFoundLocal { reason } = built.resolve_endpoint(&reference.fragment) {
                    diagnostics.push(Diagnostic::reference(
                        reference.path.clone(),
                        format!(
                            "endpoint '{}' does not resolve in '{}': {reason}",
                            reference.fragment, reference.locator
                        ),
                    ));
                }
            }
        }
    }

    diagnostics
}

fn load(path: &Path) -> Result<BuiltContract, String> {
    let document = parse_file(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "external contract unavailable");
        e.to_string()
    })?;
    build_contract(&document).map_err(|diagnostic| {
        warn!(path = %path.display(), "external contract is not a usable document");
        diagnostic.message
    })
}
