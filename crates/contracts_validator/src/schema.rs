//! Schema validation logic.
//!
//! This module checks the declared schema tree: names and logical types of
//! schema objects and properties, classifications, primary/partition key
//! ordering, and logical type options.

use crate::checks::{check_enum, require};
use contracts_core::{
    child_path, ArrayOptions, Contract, ContractValidator, Diagnostic, DiagnosticCode,
    LogicalType, LogicalTypeOptions, NumericOptions, ObjectOptions, Property, PropertyRef,
    ResolvedEndpoint, RuleCatalog, SchemaObject, StringOptions, ValidationContext,
};
use regex::Regex;
use serde_json::Number;

/// Which key a position rule is about.
#[derive(Debug, Clone, Copy)]
enum KeyKind {
    Primary,
    Partition,
}

impl KeyKind {
    fn flagged(self, property: &Property) -> bool {
        match self {
            KeyKind::Primary => property.is_primary_key(),
            KeyKind::Partition => property.is_partitioned(),
        }
    }

    fn position(self, property: &Property) -> Option<i64> {
        match self {
            KeyKind::Primary => property.primary_key_position,
            KeyKind::Partition => property.partition_key_position,
        }
    }

    fn code(self) -> DiagnosticCode {
        match self {
            KeyKind::Primary => DiagnosticCode::InvalidPrimaryKeyPositions,
            KeyKind::Partition => DiagnosticCode::InvalidPartitionKeyPositions,
        }
    }

    fn label(self) -> &'static str {
        match self {
            KeyKind::Primary => "primaryKeyPosition",
            KeyKind::Partition => "partitionKeyPosition",
        }
    }
}

/// Validates the schema tree of a contract.
pub struct SchemaValidator;

impl SchemaValidator {
    /// Creates a new schema validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates every schema object and property.
    ///
    /// Returns a list of diagnostics. An empty list indicates success.
    pub fn check(&self, contract: &Contract, catalog: &RuleCatalog) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for (i, object) in contract.schema_objects().iter().enumerate() {
            let path = format!("schema[{i}]");
            self.check_object(object, &path, catalog, &mut diagnostics);
            self.check_key_positions(object, &path, KeyKind::Primary, &mut diagnostics);
            self.check_key_positions(object, &path, KeyKind::Partition, &mut diagnostics);
        }

        for property in contract.properties() {
            self.check_property(&property, catalog, &mut diagnostics);
        }

        diagnostics
    }

    fn check_object(
        &self,
        object: &SchemaObject,
        path: &str,
        catalog: &RuleCatalog,
        out: &mut Vec<Diagnostic>,
    ) {
        require(&object.name, path, "name", out);
        require(&object.logical_type, path, "logicalType", out);
        check_enum(
            object.logical_type.as_deref(),
            &catalog.logical_types,
            path,
            "logicalType",
            out,
        );
    }

    fn check_property(&self, entry: &PropertyRef<'_>, catalog: &RuleCatalog, out: &mut Vec<Diagnostic>) {
        let property = entry.property;
        let path = entry.path.as_str();

        // array element definitions are anonymous
        if !entry.is_items {
            require(&property.name, path, "name", out);
        }
        check_enum(
            property.logical_type.as_deref(),
            &catalog.logical_types,
            path,
            "logicalType",
            out,
        );
        check_enum(
            property.classification.as_deref(),
            &catalog.classifications,
            path,
            "classification",
            out,
        );

        if let Some(options) = &property.logical_type_options {
            let options_path = child_path(path, "logicalTypeOptions");
            self.check_options(property, options, &options_path, out);
        }
    }

    /// Positions of flagged properties must form the permutation 1..N.
    ///
    /// A single flagged property without a position is implicitly first.
    fn check_key_positions(
        &self,
        object: &SchemaObject,
        path: &str,
        kind: KeyKind,
        out: &mut Vec<Diagnostic>,
    ) {
        let positions: Vec<Option<i64>> = object
            .properties()
            .iter()
            .filter(|p| kind.flagged(p))
            .map(|p| kind.position(p))
            .collect();

        let count = positions.len();
        if count == 0 || (count == 1 && positions[0].is_none()) {
            return;
        }

        let mut sorted: Vec<i64> = positions.iter().flatten().copied().collect();
        sorted.sort_unstable();
        let expected: Vec<i64> = (1..=count as i64).collect();
        if sorted == expected {
            return;
        }

        let found = positions
            .iter()
            .map(|p| p.map_or_else(|| "none".to_string(), |n| n.to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        out.push(Diagnostic::field(
            kind.code(),
            child_path(path, "properties"),
            format!(
                "{} values must form 1..{count} across the {count} flagged properties, found [{found}]",
                kind.label()
            ),
        ));
    }

    fn check_options(
        &self,
        property: &Property,
        options: &LogicalTypeOptions,
        path: &str,
        out: &mut Vec<Diagnostic>,
    ) {
        let logical_type = property.logical_type.as_deref().unwrap_or_default();

        let unknown: Vec<&str> = match options {
            // boolean has no options at all
            LogicalTypeOptions::Untyped(keys)
                if LogicalType::from_tag(logical_type) == Some(LogicalType::Boolean) =>
            {
                keys.keys().map(String::as_str).collect()
            }
            other => other.unknown_keys(),
        };
        for key in unknown {
            out.push(Diagnostic::field(
                DiagnosticCode::InvalidLogicalTypeOption,
                child_path(path, key),
                format!("'{key}' is not an option of logical type '{logical_type}'"),
            ));
        }

        match options {
            LogicalTypeOptions::String(o) => self.check_string_options(o, path, out),
            LogicalTypeOptions::Numeric(o) => self.check_numeric_options(o, path, out),
            LogicalTypeOptions::Array(o) => self.check_array_options(o, path, out),
            LogicalTypeOptions::Object(o) => self.check_object_options(property, o, path, out),
            LogicalTypeOptions::Temporal(_) | LogicalTypeOptions::Untyped(_) => {}
        }
    }

    fn check_string_options(&self, options: &StringOptions, path: &str, out: &mut Vec<Diagnostic>) {
        check_bounds(
            options.min_length.map(|n| n as f64),
            options.max_length.map(|n| n as f64),
            ("minLength", "maxLength"),
            path,
            out,
        );
        if let Some(pattern) = &options.pattern {
            if let Err(e) = Regex::new(pattern) {
                out.push(Diagnostic::field(
                    DiagnosticCode::InvalidLogicalTypeOption,
                    child_path(path, "pattern"),
                    format!("pattern does not compile: {e}"),
                ));
            }
        }
    }

    fn check_numeric_options(&self, options: &NumericOptions, path: &str, out: &mut Vec<Diagnostic>) {
        check_bounds(
            options.minimum.as_ref().and_then(Number::as_f64),
            options.maximum.as_ref().and_then(Number::as_f64),
            ("minimum", "maximum"),
            path,
            out,
        );
    }

    fn check_array_options(&self, options: &ArrayOptions, path: &str, out: &mut Vec<Diagnostic>) {
        check_bounds(
            options.min_items.map(|n| n as f64),
            options.max_items.map(|n| n as f64),
            ("minItems", "maxItems"),
            path,
            out,
        );
    }

    fn check_object_options(
        &self,
        property: &Property,
        options: &ObjectOptions,
        path: &str,
        out: &mut Vec<Diagnostic>,
    ) {
        check_bounds(
            options.min_properties.map(|n| n as f64),
            options.max_properties.map(|n| n as f64),
            ("minProperties", "maxProperties"),
            path,
            out,
        );

        let children = property.shape.children();
        for name in options.required.iter().flatten() {
            if !children.iter().any(|c| c.name.as_deref() == Some(name.as_str())) {
                out.push(Diagnostic::field(
                    DiagnosticCode::InvalidLogicalTypeOption,
                    child_path(path, "required"),
                    format!("required property '{name}' is not declared"),
                ));
            }
        }
    }
}

fn check_bounds(
    min: Option<f64>,
    max: Option<f64>,
    (min_key, max_key): (&str, &str),
    path: &str,
    out: &mut Vec<Diagnostic>,
) {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            out.push(Diagnostic::field(
                DiagnosticCode::InvalidBounds,
                path,
                format!("'{min_key}' ({min}) is greater than '{max_key}' ({max})"),
            ));
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractValidator for SchemaValidator {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn validate(
        &self,
        contract: &Contract,
        _endpoints: &[ResolvedEndpoint],
        context: &ValidationContext,
    ) -> Vec<Diagnostic> {
        self.check(contract, &context.catalog)
    }
}
