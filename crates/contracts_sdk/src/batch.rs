//! Concurrent validation of many contract files.
//!
//! Every file runs on a blocking task, bounded by a semaphore sized from
//! [`ValidationContext::max_concurrency`]. After the first fatal load error
//! the files still waiting for a permit are skipped; files already running
//! complete and keep their results.

use crate::{validate_file, Result, SdkError};
use contracts_core::{ValidationContext, ValidationReport};
use contracts_parser::ContractFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Exit code of a passing run.
pub const EXIT_PASSED: i32 = 0;
/// Exit code when at least one contract has errors.
pub const EXIT_FAILED: i32 = 1;
/// Exit code when a contract could not be loaded or built.
pub const EXIT_FATAL: i32 = 2;

/// What happened to one file of a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file was validated
    Report { report: ValidationReport },
    /// The file could not be read or parsed
    LoadError { message: String },
    /// Not started because an earlier file failed to load
    Skipped,
}

impl FileOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            FileOutcome::Report { report } if report.is_structural_failure() => EXIT_FATAL,
            FileOutcome::Report { report } if !report.passed => EXIT_FAILED,
            FileOutcome::Report { .. } => EXIT_PASSED,
            FileOutcome::LoadError { .. } | FileOutcome::Skipped => EXIT_FATAL,
        }
    }
}

/// Outcome of one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileResult>,
}

impl BatchReport {
    /// Whether every file was validated and passed.
    pub fn passed(&self) -> bool {
        self.exit_code() == EXIT_PASSED
    }

    /// Highest exit code across files.
    pub fn exit_code(&self) -> i32 {
        self.files
            .iter()
            .map(|file| file.outcome.exit_code())
            .max()
            .unwrap_or(EXIT_PASSED)
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|file| matches!(file.outcome, FileOutcome::Skipped))
            .count()
    }
}

/// Expands directories into the contract files they contain.
///
/// Directories are walked recursively; files are kept in sorted order.
/// Plain file arguments are kept as given, whatever their extension.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let io_error = |source: std::io::Error| SdkError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        entries.push(entry.map_err(io_error)?.path());
    }
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            walk(&entry, out)?;
        } else if is_contract_file(&entry) {
            out.push(entry);
        }
    }
    Ok(())
}

fn is_contract_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    let ext = ext.to_lowercase();
    ContractFormat::EXTENSIONS.iter().any(|known| *known == ext)
}

/// Validates files and directories concurrently.
///
/// # Example
///
/// ```no_run
/// use contracts_sdk::{validate_paths, ValidationContext};
/// use std::path::PathBuf;
///
/// # async fn run() -> contracts_sdk::Result<()> {
/// let context = ValidationContext::new().with_max_concurrency(8);
/// let batch = validate_paths(&[PathBuf::from("contracts/")], &context).await?;
/// std::process::exit(batch.exit_code());
/// # }
/// ```
pub async fn validate_paths(paths: &[PathBuf], context: &ValidationContext) -> Result<BatchReport> {
    let files = collect_files(paths)?;
    info!(files = files.len(), jobs = context.max_concurrency, "validating contracts");

    let semaphore = Arc::new(Semaphore::new(context.max_concurrency));
    let cancelled = Arc::new(AtomicBool::new(false));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let semaphore = Arc::clone(&semaphore);
        let cancelled = Arc::clone(&cancelled);
        let context = context.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| SdkError::Task(e.to_string()))?;

            if cancelled.load(Ordering::SeqCst) {
                return Ok(FileResult {
                    path,
                    outcome: FileOutcome::Skipped,
                });
            }

            let task_path = path.clone();
            let result = tokio::task::spawn_blocking(move || validate_file(&task_path, &context))
                .await
                .map_err(|e| SdkError::Task(e.to_string()))?;

            let outcome = match result {
                Ok(report) => FileOutcome::Report { report },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "load failed, cancelling pending files");
                    cancelled.store(true, Ordering::SeqCst);
                    FileOutcome::LoadError {
                        message: e.to_string(),
                    }
                }
            };
            Ok::<_, SdkError>(FileResult { path, outcome })
        }));
    }

    let mut batch = BatchReport::default();
    for handle in handles {
        let file = handle.await.map_err(|e| SdkError::Task(e.to_string()))??;
        batch.files.push(file);
    }

    if batch.skipped() > 0 {
        warn!(skipped = batch.skipped(), "batch cancelled after a load failure");
    }
    Ok(batch)
}
