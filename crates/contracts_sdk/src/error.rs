//! Error types for the SDK facade.

use contracts_parser::ParserError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Failures that prevent a contract from being validated at all.
///
/// A contract that loads but breaks rules is not an error: it yields a
/// failing [`contracts_core::ValidationReport`].
#[derive(Debug, Error)]
pub enum SdkError {
    /// The document could not be read or parsed
    #[error("Failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ParserError,
    },

    /// Contract text could not be parsed
    #[error("Failed to parse contract: {0}")]
    Parse(#[from] ParserError),

    /// A directory could not be listed
    #[error("Failed to read directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch task panicked or was cancelled by the runtime
    #[error("Validation task failed: {0}")]
    Task(String),
}
