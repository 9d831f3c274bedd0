use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use contracts_core::{severity_label, Diagnostic, Severity, ValidationReport};
use contracts_sdk::{BatchReport, FileOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_batch_report(batch: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(batch),
        OutputFormat::Text => {
            for file in &batch.files {
                println!("\n{}", file.path.display().to_string().bold());
                match &file.outcome {
                    FileOutcome::Report { report } => print_text_report(report),
                    FileOutcome::LoadError { message } => print_error(message),
                    FileOutcome::Skipped => {
                        println!("  {}", "skipped after an earlier load failure".yellow())
                    }
                }
            }
            print_batch_summary(batch);
            Ok(())
        }
    }
}

fn print_text_report(report: &ValidationReport) {
    for diagnostic in &report.diagnostics {
        println!("  {}", format_diagnostic(diagnostic));
    }

    for reference in &report.external_references {
        println!(
            "  {} [{}] external reference to {}#{}",
            "ℹ".blue().bold(),
            reference.path,
            reference.locator,
            reference.fragment
        );
    }

    if report.passed {
        println!("  {} {}", "✓".green().bold(), report.summary().green().bold());
    } else {
        println!("  {} {}", "✗".red().bold(), report.summary().red().bold());
    }
}

/// `[path] message`, labelled and colored by severity.
fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let path = if diagnostic.path.is_empty() {
        "<root>"
    } else {
        &diagnostic.path
    };
    let line = format!(
        "{:<7} [{}] {} ({})",
        severity_label(diagnostic.severity),
        path,
        diagnostic.message,
        diagnostic.code
    );
    match diagnostic.severity {
        Severity::Error => line.red().to_string(),
        Severity::Warning => line.yellow().to_string(),
    }
}

fn print_batch_summary(batch: &BatchReport) {
    let mut passed = 0;
    let mut failed = 0;
    let mut unloaded = 0;
    for file in &batch.files {
        match &file.outcome {
            FileOutcome::Report { report } if report.passed => passed += 1,
            FileOutcome::Report { .. } => failed += 1,
            FileOutcome::LoadError { .. } | FileOutcome::Skipped => unloaded += 1,
        }
    }

    println!("\n{}", "═".repeat(60));
    println!(
        "  {} file(s): {} passed, {} failed, {} not validated",
        batch.files.len(),
        passed.to_string().green(),
        failed.to_string().red(),
        unloaded.to_string().yellow()
    );
    println!("{}", "═".repeat(60));
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
