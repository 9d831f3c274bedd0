//! # Data Contracts SDK
//!
//! Public API for validating ODCS v3.1.0 data contracts from text, files
//! and directories. This crate ties together the loader, the typed model
//! and the rule validator:
//!
//! - [`validate_str`]: contract text in a known format
//! - [`validate_file`]: one file, optionally following external references
//! - [`validate_paths`]: files and directories, validated concurrently
//!
//! ## Example
//!
//! ```no_run
//! use contracts_sdk::{validate_file, ValidationContext};
//! use std::path::Path;
//!
//! let context = ValidationContext::new().with_follow_external(true);
//! let report = validate_file(Path::new("contracts/orders.odcs.yaml"), &context).unwrap();
//!
//! for diagnostic in &report.diagnostics {
//!     println!("{diagnostic}");
//! }
//! println!("{}", report.summary());
//! ```

mod batch;
mod error;
pub mod external;
mod validate;

pub use batch::*;
pub use error::*;
pub use validate::*;

pub use contracts_core::{
    Diagnostic, DiagnosticCode, DiagnosticKind, RuleCatalog, Severity, ValidationContext,
    ValidationReport,
};
pub use contracts_parser::{load_catalog, ContractFormat};
pub use contracts_validator::RuleValidator;
