//! Relationship endpoint locators.
//!
//! Every endpoint string is classified exactly once by [`Locator::parse`]
//! into one of three forms:
//!
//! - shorthand: `orders.customer_id` or `orders.lines.sku`, resolved by name;
//! - fully qualified: `schema/orders_tbl/properties/customer_fk`, resolved by
//!   explicit id with every id required to be a direct child of the
//!   previous element (`items` steps into an array's element definition);
//! - external: `other-contract.yaml#customers.id`, never dereferenced here.
//!
//! A `#` inside the locator part can be escaped as `\#`. An empty locator
//! before the `#` (`#orders.id`) refers to the current document.

use crate::{
    child_path, index_path, Address, BuiltContract, Contract, Diagnostic, DiagnosticCode,
    Endpoint, IdIndex, Property, Relationship, Shape, Step,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Reasons an endpoint string cannot be classified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("endpoint is empty")]
    Empty,

    #[error("external reference '{0}' has no fragment after '#'")]
    EmptyFragment(String),

    #[error("fragment '{0}' contains another unescaped '#'")]
    NestedFragment(String),

    #[error("shorthand '{0}' must name an object and at least one property")]
    MalformedShorthand(String),

    #[error("fully-qualified path '{path}' is malformed: {reason}")]
    MalformedPath { path: String, reason: String },
}

/// One step of a fully-qualified path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "token", content = "id")]
pub enum PathSegment {
    /// `schema/<id>`
    Schema(String),
    /// `properties/<id>`
    Properties(String),
    /// `items`
    Items,
}

/// A classified endpoint string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Dot-separated names: object first, then nested properties
    Shorthand(Vec<String>),
    /// Token/id path anchored at `schema`
    FullyQualified(Vec<PathSegment>),
    /// Pointer into another document; the fragment is kept verbatim
    External { locator: String, fragment: String },
}

impl Locator {
    /// Classifies an endpoint string.
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        if input.trim().is_empty() {
            return Err(LocatorError::Empty);
        }

        match split_fragment(input) {
            None => parse_local(&unescape(input)),
            Some((locator, fragment)) => {
                if fragment.is_empty() {
                    return Err(LocatorError::EmptyFragment(input.to_string()));
                }
                if split_fragment(fragment).is_some() {
                    return Err(LocatorError::NestedFragment(fragment.to_string()));
                }
                let fragment = unescape(fragment);
                // validates the fragment even though it is not resolved here
                let local = parse_local(&fragment)?;
                if locator.is_empty() {
                    return Ok(local);
                }
                Ok(Locator::External {
                    locator: unescape(locator),
                    fragment,
                })
            }
        }
    }

    /// Human-readable name of the form.
    pub fn form(&self) -> &'static str {
        match self {
            Locator::Shorthand(_) => "shorthand",
            Locator::FullyQualified(_) => "fully-qualified",
            Locator::External { .. } => "external",
        }
    }

    /// Resolves the locator against the contract it was declared in.
    pub fn resolve(&self, contract: &Contract, index: &IdIndex) -> Resolution {
        match self {
            Locator::Shorthand(names) => resolve_shorthand(contract, names),
            Locator::FullyQualified(segments) => resolve_qualified(contract, index, segments),
            Locator::External { locator, fragment } => Resolution::ExternalUnresolved {
                locator: locator.clone(),
                fragment: fragment.clone(),
            },
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Shorthand(names) => f.write_str(&names.join(".")),
            Locator::FullyQualified(segments) => {
                let parts: Vec<String> = segments
                    .iter()
                    .map(|segment| match segment {
                        PathSegment::Schema(id) => format!("schema/{id}"),
                        PathSegment::Properties(id) => format!("properties/{id}"),
                        PathSegment::Items => "items".to_string(),
                    })
                    .collect();
                f.write_str(&parts.join("/"))
            }
            Locator::External { locator, fragment } => {
                write!(f, "{}#{fragment}", locator.replace('#', "\\#"))
            }
        }
    }
}

/// Splits at the first unescaped `#`.
fn split_fragment(input: &str) -> Option<(&str, &str)> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1) == Some(&b'#') => i += 2,
            b'#' => return Some((&input[..i], &input[i + 1..])),
            _ => i += 1,
        }
    }
    None
}

fn unescape(input: &str) -> String {
    input.replace("\\#", "#")
}

fn parse_local(input: &str) -> Result<Locator, LocatorError> {
    if input.starts_with("schema/") {
        return parse_qualified(input);
    }
    let names: Vec<String> = input.split('.').map(str::to_string).collect();
    if names.len() < 2 || names.iter().any(|n| n.trim().is_empty()) {
        return Err(LocatorError::MalformedShorthand(input.to_string()));
    }
    Ok(Locator::Shorthand(names))
}

fn parse_qualified(input: &str) -> Result<Locator, LocatorError> {
    let malformed = |reason: &str| LocatorError::MalformedPath {
        path: input.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = input.split('/');
    let mut segments = Vec::new();
    while let Some(token) = parts.next() {
        let segment = match token {
            "schema" if segments.is_empty() => PathSegment::Schema(
                next_id(&mut parts)
                    .ok_or_else(|| malformed("'schema' must be followed by an id"))?,
            ),
            "schema" => return Err(malformed("'schema' may only appear first")),
            "properties" => PathSegment::Properties(
                next_id(&mut parts)
                    .ok_or_else(|| malformed("'properties' must be followed by an id"))?,
            ),
            "items" => PathSegment::Items,
            other => return Err(malformed(&format!("unexpected token '{other}'"))),
        };
        segments.push(segment);
    }

    if segments.len() < 2 {
        return Err(malformed("path must address a property"));
    }
    Ok(Locator::FullyQualified(segments))
}

fn next_id<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<String> {
    parts
        .next()
        .filter(|id| !id.trim().is_empty())
        .map(str::to_string)
}

/// Outcome of resolving one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// The endpoint names an entity of this contract
    Found { address: Address },
    /// The endpoint is local but names nothing; always a reference error
    NotFoundLocal { reason: String },
    /// The endpoint points into another document; informational only
    ExternalUnresolved { locator: String, fragment: String },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }
}

fn not_found(reason: impl Into<String>) -> Resolution {
    Resolution::NotFoundLocal {
        reason: reason.into(),
    }
}

/// Parses and resolves an endpoint string in one step.
///
/// A string that cannot be classified resolves to `NotFoundLocal`.
pub fn resolve_endpoint(endpoint: &str, contract: &Contract, index: &IdIndex) -> Resolution {
    match Locator::parse(endpoint) {
        Ok(locator) => locator.resolve(contract, index),
        Err(e) => not_found(e.to_string()),
    }
}

fn resolve_shorthand(contract: &Contract, names: &[String]) -> Resolution {
    let Some((object_name, property_names)) = names.split_first() else {
        return not_found("empty shorthand");
    };
    let Some(position) = contract
        .schema_objects()
        .iter()
        .position(|o| o.name.as_deref() == Some(object_name.as_str()))
    else {
        return not_found(format!("no schema object named '{object_name}'"));
    };

    let mut shape = &contract.schema_objects()[position].shape;
    let mut address = Address::schema(position);
    let mut walked = object_name.clone();
    for name in property_names {
        let Some((property, child)) = find_named(shape, &address, name) else {
            return not_found(format!("'{walked}' has no property named '{name}'"));
        };
        shape = &property.shape;
        address = child;
        walked = format!("{walked}.{name}");
    }

    Resolution::Found { address }
}

/// Finds a named child, descending through arrays into their element.
fn find_named<'a>(shape: &'a Shape, address: &Address, name: &str) -> Option<(&'a Property, Address)> {
    match shape {
        Shape::Object { properties } => properties
            .iter()
            .flatten()
            .enumerate()
            .find(|(_, p)| p.name.as_deref() == Some(name))
            .map(|(i, p)| (p, address.child(Step::Property(i)))),
        Shape::Array { items } => find_named(&items.shape, &address.child(Step::Items), name),
        Shape::Scalar => None,
    }
}

fn resolve_qualified(contract: &Contract, index: &IdIndex, segments: &[PathSegment]) -> Resolution {
    let mut current: Option<Address> = None;

    for segment in segments {
        let next = match (segment, &current) {
            (PathSegment::Schema(id), None) => match index.get(id) {
                Some(address) if address.is_schema_object() => address.clone(),
                Some(_) => return not_found(format!("id '{id}' is not a schema object")),
                None => return not_found(format!("id '{id}' is not declared")),
            },
            (PathSegment::Properties(id), Some(parent)) => {
                let Some(address) = index.get(id) else {
                    return not_found(format!("id '{id}' is not declared"));
                };
                let is_child = matches!(address.steps.last(), Some(Step::Property(_)))
                    && address.parent().is_some_and(|p| {
                        p == *parent || p == parent.child(Step::Items)
                    });
                if !is_child {
                    return not_found(format!("id '{id}' is not a property of {parent}"));
                }
                address.clone()
            }
            (PathSegment::Items, Some(parent)) => {
                let address = parent.child(Step::Items);
                if contract.entity_at(&address).is_none() {
                    return not_found(format!("{parent} is not an array"));
                }
                address
            }
            _ => return not_found("path must start with 'schema/<id>'"),
        };
        current = Some(next);
    }

    match current {
        Some(address) if contract.entity_at(&address).is_some() => Resolution::Found { address },
        _ => not_found("path does not address an entity"),
    }
}

/// Which side of a relationship an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointSide {
    From,
    To,
}

/// Where a relationship is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipLevel {
    SchemaObject,
    Property,
}

/// A single endpoint string together with its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    /// Document path of the endpoint string
    pub path: String,
    pub endpoint: String,
    pub side: EndpointSide,
    pub resolution: Resolution,
}

/// Placement and shape problems of one relationship.
///
/// A property-level relationship carrying `from` yields exactly one
/// diagnostic and nothing else is checked for it.
pub fn placement_diagnostics(
    relationship: &Relationship,
    level: RelationshipLevel,
    path: &str,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    match level {
        RelationshipLevel::Property => {
            if relationship.from.is_some() {
                diagnostics.push(Diagnostic::field(
                    DiagnosticCode::FromNotAllowedAtPropertyLevel,
                    child_path(path, "from"),
                    "property-level relationship must not declare 'from'; the property itself is the source",
                ));
                return diagnostics;
            }
            match &relationship.to {
                None => diagnostics.push(missing_endpoint(path, "to")),
                Some(Endpoint::Composite(_)) => diagnostics.push(Diagnostic::field(
                    DiagnosticCode::EndpointShapeMismatch,
                    child_path(path, "to"),
                    "property-level relationship must have a single target",
                )),
                Some(Endpoint::Single(_)) => {}
            }
        }
        RelationshipLevel::SchemaObject => {
            let (from, to) = (&relationship.from, &relationship.to);
            for (key, endpoint) in [("from", from), ("to", to)] {
                match endpoint {
                    None => diagnostics.push(missing_endpoint(path, key)),
                    Some(Endpoint::Composite(values)) if values.is_empty() => {
                        diagnostics.push(missing_endpoint(path, key))
                    }
                    Some(_) => {}
                }
            }
            if !diagnostics.is_empty() {
                return diagnostics;
            }

            match (from, to) {
                (Some(Endpoint::Composite(sources)), Some(Endpoint::Composite(targets)))
                    if sources.len() != targets.len() =>
                {
                    diagnostics.push(Diagnostic::field(
                        DiagnosticCode::EndpointLengthMismatch,
                        path,
                        format!(
                            "source has {} endpoints but target has {}",
                            sources.len(),
                            targets.len()
                        ),
                    ));
                }
                (Some(Endpoint::Single(_)), Some(Endpoint::Composite(_)))
                | (Some(Endpoint::Composite(_)), Some(Endpoint::Single(_))) => {
                    diagnostics.push(Diagnostic::field(
                        DiagnosticCode::EndpointShapeMismatch,
                        path,
                        "source and target must both be single values or both sequences",
                    ));
                }
                _ => {}
            }
        }
    }

    diagnostics
}

fn missing_endpoint(path: &str, key: &str) -> Diagnostic {
    Diagnostic::field(
        DiagnosticCode::MissingRelationshipEndpoint,
        child_path(path, key),
        format!("relationship requires '{key}'"),
    )
}

/// Every relationship of a contract with its document path and level.
pub fn declared_relationships(contract: &Contract) -> Vec<(String, RelationshipLevel, &Relationship)> {
    let mut out = Vec::new();
    for (i, object) in contract.schema_objects().iter().enumerate() {
        let base = child_path(&format!("schema[{i}]"), "relationships");
        for (j, relationship) in object.relationships().iter().enumerate() {
            out.push((
                index_path(&base, j),
                RelationshipLevel::SchemaObject,
                relationship,
            ));
        }
    }
    for property in contract.properties() {
        let base = child_path(&property.path, "relationships");
        for (j, relationship) in property.property.relationships().iter().enumerate() {
            out.push((index_path(&base, j), RelationshipLevel::Property, relationship));
        }
    }
    out
}

/// Resolves every endpoint of every well-placed relationship.
pub fn resolve_relationships(contract: &Contract, index: &IdIndex) -> Vec<ResolvedEndpoint> {
    let mut resolved = Vec::new();

    for (path, level, relationship) in declared_relationships(contract) {
        if !placement_diagnostics(relationship, level, &path).is_empty() {
            continue;
        }
        let sides = [
            (EndpointSide::From, "from", &relationship.from),
            (EndpointSide::To, "to", &relationship.to),
        ];
        for (side, key, endpoint) in sides {
            let Some(endpoint) = endpoint else { continue };
            let key_path = child_path(&path, key);
            let entries: Vec<(String, &str)> = match endpoint {
                Endpoint::Single(value) => vec![(key_path, value.as_str())],
                Endpoint::Composite(values) => values
                    .iter()
                    .enumerate()
                    .map(|(k, value)| (index_path(&key_path, k), value.as_str()))
                    .collect(),
            };
            for (endpoint_path, value) in entries {
                resolved.push(ResolvedEndpoint {
                    path: endpoint_path,
                    endpoint: value.to_string(),
                    side,
                    resolution: resolve_endpoint(value, contract, index),
                });
            }
        }
    }

    resolved
}

impl BuiltContract {
    /// Resolves every relationship endpoint of this contract.
    pub fn resolve(&self) -> Vec<ResolvedEndpoint> {
        resolve_relationships(&self.contract, &self.index)
    }

    /// Resolves a single endpoint string against this contract.
    pub fn resolve_endpoint(&self, endpoint: &str) -> Resolution {
        resolve_endpoint(endpoint, &self.contract, &self.index)
    }
}
