//! Error and diagnostic types for data contracts.
//!
//! Two families live here. [`ContractError`] is the ordinary `Result` error
//! for library operations that can genuinely fail (compiling a catalogue
//! pattern, serializing a model). [`Diagnostic`] is a validation finding:
//! the engine never aborts on a bad contract, it accumulates diagnostics.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for data contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Main error type for data contract operations.
#[derive(Error, Debug)]
pub enum ContractError {
    /// A catalogue pattern failed to compile
    #[error("Invalid pattern for '{name}': {message}")]
    InvalidPattern {
        /// Catalogue entry holding the pattern
        name: String,
        /// Compiler message
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Severity of a diagnostic.
///
/// Ordering puts errors first, which is the order the report presents them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Makes the contract invalid
    Error,
    /// Informational; never affects the verdict
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Diagnostic taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Top-level or section shape is fundamentally wrong; no model exists
    Structural,
    /// Missing required field, invalid enum value, pattern mismatch
    Field,
    /// A relationship endpoint does not resolve inside the document
    Reference,
    /// Deprecated usage or a normalized legacy structure
    Warning,
}

impl DiagnosticKind {
    /// Severity implied by the kind.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::Warning => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Stable machine-readable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    // structural
    NotAMapping,
    InvalidSectionShape,
    // fields
    MissingField,
    InvalidType,
    InvalidValue,
    PatternMismatch,
    DuplicateId,
    ObjectWithoutProperties,
    ArrayWithoutItems,
    InvalidPrimaryKeyPositions,
    InvalidPartitionKeyPositions,
    InvalidLogicalTypeOption,
    InvalidBounds,
    RootOnlyDefinitionType,
    // relationships
    FromNotAllowedAtPropertyLevel,
    MissingRelationshipEndpoint,
    EndpointShapeMismatch,
    EndpointLengthMismatch,
    // quality
    QualityOperatorCount,
    BetweenArity,
    QualityVariantConflict,
    BetweenBoundsReversed,
    // references
    UnresolvedReference,
    // deprecations
    DeprecatedTeamList,
    DeprecatedSlaDefaultElement,
    DeprecatedQualityRuleField,
    ExternalReferenceUnavailable,
}

impl DiagnosticCode {
    /// The stable snake_case name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::NotAMapping => "not_a_mapping",
            DiagnosticCode::InvalidSectionShape => "invalid_section_shape",
            DiagnosticCode::MissingField => "missing_field",
            DiagnosticCode::InvalidType => "invalid_type",
            DiagnosticCode::InvalidValue => "invalid_value",
            DiagnosticCode::PatternMismatch => "pattern_mismatch",
            DiagnosticCode::DuplicateId => "duplicate_id",
            DiagnosticCode::ObjectWithoutProperties => "object_without_properties",
            DiagnosticCode::ArrayWithoutItems => "array_without_items",
            DiagnosticCode::InvalidPrimaryKeyPositions => "invalid_primary_key_positions",
            DiagnosticCode::InvalidPartitionKeyPositions => "invalid_partition_key_positions",
            DiagnosticCode::InvalidLogicalTypeOption => "invalid_logical_type_option",
            DiagnosticCode::InvalidBounds => "invalid_bounds",
            DiagnosticCode::RootOnlyDefinitionType => "root_only_definition_type",
            DiagnosticCode::FromNotAllowedAtPropertyLevel => "from_not_allowed_at_property_level",
            DiagnosticCode::MissingRelationshipEndpoint => "missing_relationship_endpoint",
            DiagnosticCode::EndpointShapeMismatch => "endpoint_shape_mismatch",
            DiagnosticCode::EndpointLengthMismatch => "endpoint_length_mismatch",
            DiagnosticCode::QualityOperatorCount => "quality_operator_count",
            DiagnosticCode::BetweenArity => "between_arity",
            DiagnosticCode::QualityVariantConflict => "quality_variant_conflict",
            DiagnosticCode::BetweenBoundsReversed => "between_bounds_reversed",
            DiagnosticCode::UnresolvedReference => "unresolved_reference",
            DiagnosticCode::DeprecatedTeamList => "deprecated_team_list",
            DiagnosticCode::DeprecatedSlaDefaultElement => "deprecated_sla_default_element",
            DiagnosticCode::DeprecatedQualityRuleField => "deprecated_quality_rule_field",
            DiagnosticCode::ExternalReferenceUnavailable => "external_reference_unavailable",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Error or warning
    pub severity: Severity,

    /// Taxonomy bucket
    pub kind: DiagnosticKind,

    /// Stable code
    pub code: DiagnosticCode,

    /// Human-readable message
    pub message: String,

    /// Document path of the offending element (empty for the root)
    pub path: String,
}

impl Diagnostic {
    /// Creates a diagnostic; severity follows from the kind.
    pub fn new(
        kind: DiagnosticKind,
        code: DiagnosticCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            code,
            message: message.into(),
            path: path.into(),
        }
    }

    /// Fatal shape error.
    pub fn structural(
        code: DiagnosticCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(DiagnosticKind::Structural, code, path, message)
    }

    /// Accumulated field error.
    pub fn field(code: DiagnosticCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Field, code, path, message)
    }

    /// Accumulated reference error.
    pub fn reference(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            DiagnosticKind::Reference,
            DiagnosticCode::UnresolvedReference,
            path,
            message,
        )
    }

    /// Warning; never affects the verdict.
    pub fn warning(
        code: DiagnosticCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(DiagnosticKind::Warning, code, path, message)
    }

    /// Shorthand for a missing required field.
    pub fn missing(path: impl Into<String>, field: &str) -> Self {
        Self::field(
            DiagnosticCode::MissingField,
            path,
            format!("missing required field '{field}'"),
        )
    }

    /// Checks if this diagnostic has error severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Checks if this diagnostic has warning severity.
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        };
        write!(
            f,
            "[{}] {} at {}: {}",
            self.severity, self.code, path, self.message
        )
    }
}

/// Joins a parent path and a key into a child document path.
pub fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Appends a sequence index to a document path.
pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}
