use anyhow::{Context, Result};
use contracts_sdk::{load_catalog, validate_paths, ValidationContext, EXIT_PASSED};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::output::{self, OutputFormat};

pub async fn execute(
    paths: &[PathBuf],
    format: OutputFormat,
    catalog: Option<&Path>,
    follow_external: bool,
    jobs: Option<usize>,
) -> Result<()> {
    let mut context = ValidationContext::new().with_follow_external(follow_external);

    if let Some(path) = catalog {
        let catalog = load_catalog(path)
            .with_context(|| format!("Failed to load rule catalogue: {}", path.display()))?;
        info!("Using rule catalogue: {}", path.display());
        context = context.with_catalog(catalog);
    }

    if let Some(jobs) = jobs {
        context = context.with_max_concurrency(jobs);
    }

    let batch = validate_paths(paths, &context)
        .await
        .context("Failed to validate contracts")?;

    output::print_batch_report(&batch, format)?;

    let code = batch.exit_code();
    if code != EXIT_PASSED {
        std::process::exit(code);
    }

    Ok(())
}
