//! # Data Contracts Core
//!
//! Core data structures and engine for validating ODCS v3.1.0 data contracts.
//!
//! A data contract is a formal agreement about the structure, quality, and
//! semantics of data shared between systems. This crate turns a parsed
//! document tree into a typed [`Contract`], resolves the relationship
//! endpoints it declares, and defines the diagnostics and report types the
//! rule validator produces.
//!
//! ## Key Concepts
//!
//! - **Contract**: typed model with a closed nesting [`Shape`] per schema element
//! - **IdIndex**: explicit id → structural [`Address`] map built alongside the model
//! - **Locator**: classified relationship endpoint (shorthand, fully qualified, external)
//! - **Diagnostic**: a finding with severity, stable code, message and document path
//! - **RuleCatalog**: injectable enumerations and patterns the rules check against
//!
//! ## Example
//!
//! ```rust
//! use contracts_core::{build_contract, Resolution};
//! use serde_json::json;
//!
//! let document = json!({
//!     "schema": [
//!         {"name": "customers", "logicalType": "object",
//!          "properties": [{"name": "id", "logicalType": "string"}]},
//!         {"name": "orders", "logicalType": "object",
//!          "properties": [{"name": "customer_id", "logicalType": "string",
//!                          "relationships": [{"to": "customers.id"}]}]}
//!     ]
//! });
//!
//! let built = build_contract(&document).unwrap();
//! let endpoints = built.resolve();
//! assert!(matches!(endpoints[0].resolution, Resolution::Found { .. }));
//! ```

pub mod builder;
pub mod catalog;
pub mod contract;
pub mod error;
pub mod index;
pub mod locator;
pub mod validator;

pub use builder::*;
pub use catalog::*;
pub use contract::*;
pub use error::*;
pub use index::*;
pub use locator::*;
pub use validator::*;
