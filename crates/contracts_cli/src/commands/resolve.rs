use anyhow::{anyhow, Context, Result};
use contracts_core::{build_contract, Locator, Resolution};
use contracts_parser::parse_file;
use contracts_sdk::EXIT_FAILED;
use serde_json::json;
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat};

pub async fn execute(contract_path: &Path, endpoint: &str, format: OutputFormat) -> Result<()> {
    info!("Resolving '{}' in {}", endpoint, contract_path.display());

    let document = parse_file(contract_path)
        .with_context(|| format!("Failed to parse contract file: {}", contract_path.display()))?;
    let built = build_contract(&document)
        .map_err(|diagnostic| anyhow!("Contract cannot be modelled: {diagnostic}"))?;

    let locator = Locator::parse(endpoint);
    let resolution = built.resolve_endpoint(endpoint);

    match format {
        OutputFormat::Json => output::print_json(&json!({
            "endpoint": endpoint,
            "form": locator.as_ref().map(Locator::form).ok(),
            "resolution": resolution,
        }))?,
        OutputFormat::Text => {
            match &locator {
                Ok(locator) => output::print_info(&format!("{} locator: {locator}", locator.form())),
                Err(e) => output::print_error(&format!("Unclassifiable endpoint: {e}")),
            }
            match &resolution {
                Resolution::Found { address } => {
                    let name = built
                        .contract
                        .entity_at(address)
                        .and_then(|entity| entity.name())
                        .unwrap_or("<unnamed>");
                    output::print_success(&format!("Found '{name}' at {address}"));
                }
                Resolution::NotFoundLocal { reason } => {
                    output::print_error(&format!("Not found: {reason}"));
                }
                Resolution::ExternalUnresolved { locator, fragment } => {
                    output::print_info(&format!(
                        "External reference: '{fragment}' in {locator} (not resolved)"
                    ));
                }
            }
        }
    }

    if matches!(resolution, Resolution::NotFoundLocal { .. }) {
        std::process::exit(EXIT_FAILED);
    }

    Ok(())
}
