//! Loader for data contract documents (YAML/JSON/TOML formats).
//!
//! This module turns contract text into the generic document tree
//! (`serde_json::Value`) the model builder consumes, and reads rule
//! catalogue override files. Nothing here interprets ODCS semantics:
//! a document that parses is handed over as-is, whatever its shape.
//!
//! # Example
//!
//! ```rust
//! use contracts_parser::parse_yaml;
//!
//! let yaml = r#"
//! apiVersion: v3.1.0
//! kind: DataContract
//! schema:
//!   - name: users
//!     logicalType: object
//! "#;
//!
//! let document = parse_yaml(yaml).expect("Failed to parse contract");
//! assert_eq!(document["schema"][0]["name"], "users");
//! ```

use contracts_core::{CatalogOverrides, ContractError, RuleCatalog};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a document.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// A rule catalogue file is well formed but unusable
    #[error("Invalid rule catalogue: {0}")]
    CatalogError(#[from] ContractError),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported contract file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// JSON format (.json)
    Json,
    /// TOML format (.toml)
    Toml,
}

impl ContractFormat {
    /// File extensions recognized when scanning directories.
    pub const EXTENSIONS: [&'static str; 4] = ["yaml", "yml", "json", "toml"];
}

/// Parse a document from a YAML string.
pub fn parse_yaml(content: &str) -> Result<Value> {
    let document: Value = serde_yaml_ng::from_str(content)?;
    Ok(document)
}

/// Parse a document from a JSON string.
pub fn parse_json(content: &str) -> Result<Value> {
    let document: Value = serde_json::from_str(content)?;
    Ok(document)
}

/// Parse a document from a TOML string.
///
/// # Example
///
/// ```rust
/// use contracts_parser::parse_toml;
///
/// let toml = r#"
/// apiVersion = "v3.1.0"
/// kind = "DataContract"
///
/// [[schema]]
/// name = "users"
/// logicalType = "object"
/// "#;
///
/// let document = parse_toml(toml).unwrap();
/// assert_eq!(document["schema"][0]["logicalType"], "object");
/// ```
pub fn parse_toml(content: &str) -> Result<Value> {
    let document: Value =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(document)
}

/// Parse a document in the given format.
pub fn parse_str(content: &str, format: ContractFormat) -> Result<Value> {
    match format {
        ContractFormat::Yaml => parse_yaml(content),
        ContractFormat::Json => parse_json(content),
        ContractFormat::Toml => parse_toml(content),
    }
}

/// Detect the document format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `ContractFormat::Yaml`
/// * `.json` → `ContractFormat::Json`
/// * `.toml` → `ContractFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<ContractFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(ContractFormat::Yaml),
        "json" => Ok(ContractFormat::Json),
        "toml" => Ok(ContractFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a document from a file with automatic format detection.
///
/// ```no_run
/// use contracts_parser::parse_file;
/// use std::path::Path;
///
/// let document = parse_file(Path::new("contracts/orders.odcs.yaml")).unwrap();
/// println!("Loaded contract: {}", document["id"]);
/// ```
pub fn parse_file(path: &Path) -> Result<Value> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), ?format, "parsing document");
    parse_str(&content, format)
}

/// Load a rule catalogue override file and apply it over the ODCS v3.1.0
/// defaults.
///
/// ```yaml
/// statuses: [draft, active, retired]
/// serverEnvironments: [prod, dev, sandbox]
/// ```
pub fn load_catalog(path: &Path) -> Result<RuleCatalog> {
    let document = parse_file(path)?;
    let overrides: CatalogOverrides = serde_json::from_value(document)?;
    Ok(RuleCatalog::default().with_overrides(overrides)?)
}
