//! # Data Contracts Validator
//!
//! Rule validator for ODCS v3.1.0 data contracts. One sub-validator per
//! rule area, orchestrated by [`RuleValidator`]:
//!
//! - Fundamentals (apiVersion, kind, id, version, status)
//! - Schema (required fields, logical types, key positions, type options)
//! - Relationships (placement, endpoint shape, local resolution)
//! - Quality (variant fields, comparison operators, ranges)
//! - Metadata (servers, SLA, team, roles, support, annotations)
//! - Deprecation (legacy shapes, as warnings)
//!
//! ## Example
//!
//! ```rust
//! use contracts_validator::RuleValidator;
//! use contracts_core::ValidationContext;
//! use serde_json::json;
//!
//! let document = json!({
//!     "apiVersion": "v3.1.0",
//!     "kind": "DataContract",
//!     "id": "53581432-6c55-4ba2-a65f-72344a91553a",
//!     "version": "1.0.0",
//!     "status": "draft",
//!     "schema": [{
//!         "name": "orders",
//!         "logicalType": "object",
//!         "properties": [{"name": "id", "logicalType": "integer", "primaryKey": true}]
//!     }]
//! });
//!
//! let report = RuleValidator::new().validate_document(&document, &ValidationContext::new());
//! assert!(report.passed, "{report}");
//! ```

mod checks;
mod deprecation;
mod engine;
mod fundamentals;
mod metadata;
mod quality;
mod relationships;
mod schema;

pub use deprecation::*;
pub use engine::*;
pub use fundamentals::*;
pub use metadata::*;
pub use quality::*;
pub use relationships::*;
pub use schema::*;
