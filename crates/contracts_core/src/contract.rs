//! Data contract types and structures.
//!
//! This module contains the typed representation of an ODCS v3.1.0 contract:
//! the fundamentals, the recursive schema tree, relationships, quality rules,
//! and the flat metadata records. Every entity keeps the keys it does not
//! recognize in an `extensions` map so that [`Contract::to_document`] can
//! re-derive an equivalent document tree.

use crate::Result;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Keys of a mapping that are not part of the typed model.
pub type Extensions = Map<String, Value>;

/// A data contract document.
///
/// A `Contract` is created once per input document by the model builder and
/// never mutated afterwards. It exclusively owns every schema object,
/// property, relationship and quality rule reachable from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Standard version the document claims (e.g. "v3.1.0")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Document kind, always "DataContract" for valid documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Contract identifier (UUID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Semantic version of the contract (e.g. "1.0.0")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Lifecycle status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Human-readable name of the data product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Business domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_product: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Structured description (purpose, limitations, usage)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<ContractDescription>,

    /// Tables, views, topics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Vec<SchemaObject>>,

    /// Contract-level quality rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Vec<QualityRule>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    /// Deprecated since v3.1.0 in favor of `slaProperties[].element`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_default_element: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_properties: Option<Vec<SlaProperty>>,

    /// Owning team; legacy member lists are normalized into this form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<Vec<SupportChannel>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authoritative_definitions: Option<Vec<AuthoritativeDefinition>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<Vec<CustomProperty>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_created_ts: Option<String>,

    /// Unknown top-level keys, preserved verbatim
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Contract {
    /// Schema objects in document order (empty when the section is absent).
    pub fn schema_objects(&self) -> &[SchemaObject] {
        self.schema.as_deref().unwrap_or_default()
    }

    /// Re-derives a document tree equivalent to the one the contract was built from.
    ///
    /// The only difference to the original input is the normalization of a
    /// legacy team member list into the team object form.
    pub fn to_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Flattens the schema tree into every property with its document path.
    ///
    /// Properties are listed depth-first in document order; `items` elements
    /// of array properties are included.
    pub fn properties(&self) -> Vec<PropertyRef<'_>> {
        let mut out = Vec::new();
        for (schema_index, object) in self.schema_objects().iter().enumerate() {
            let path = format!("schema[{schema_index}]");
            let name_path = object.name.clone().unwrap_or_default();
            collect_properties(&object.shape, &path, &name_path, schema_index, &mut out);
        }
        out
    }
}

fn collect_properties<'a>(
    shape: &'a Shape,
    parent_path: &str,
    parent_name_path: &str,
    schema_index: usize,
    out: &mut Vec<PropertyRef<'a>>,
) {
    match shape {
        Shape::Scalar => {}
        Shape::Object { properties } => {
            for (i, property) in properties.iter().flatten().enumerate() {
                let path = format!("{parent_path}.properties[{i}]");
                let name_path = match &property.name {
                    Some(name) => format!("{parent_name_path}.{name}"),
                    None => format!("{parent_name_path}.[{i}]"),
                };
                out.push(PropertyRef {
                    path: path.clone(),
                    name_path: name_path.clone(),
                    schema_index,
                    is_items: false,
                    property,
                });
                collect_properties(&property.shape, &path, &name_path, schema_index, out);
            }
        }
        Shape::Array { items } => {
            let path = format!("{parent_path}.items");
            out.push(PropertyRef {
                path: path.clone(),
                name_path: parent_name_path.to_string(),
                schema_index,
                is_items: true,
                property: items,
            });
            collect_properties(&items.shape, &path, parent_name_path, schema_index, out);
        }
    }
}

/// A property together with where it sits in the document.
#[derive(Debug, Clone)]
pub struct PropertyRef<'a> {
    /// Document path, e.g. `schema[0].properties[2].items`
    pub path: String,
    /// Dotted name path, e.g. `orders.lines.sku`
    pub name_path: String,
    /// Position of the owning schema object
    pub schema_index: usize,
    /// Whether this is the element definition of an array property
    pub is_items: bool,
    pub property: &'a Property,
}

/// Root-level structured description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authoritative_definitions: Option<Vec<AuthoritativeDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<Vec<CustomProperty>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Logical types known to the standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Timestamp,
    Time,
    Object,
    Array,
}

impl LogicalType {
    /// Parses a logical type tag; `None` for anything the standard does not define.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "timestamp" => Some(Self::Timestamp),
            "time" => Some(Self::Time),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }
}

/// Nesting shape of a schema element.
///
/// An object owns ordered child properties, an array owns exactly one element
/// definition, everything else is a leaf.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Shape {
    Object {
        /// `None` when the document declared no `properties` key
        #[serde(skip_serializing_if = "Option::is_none")]
        properties: Option<Vec<Property>>,
    },
    Array {
        items: Box<Property>,
    },
    #[default]
    Scalar,
}

impl Shape {
    /// Direct structural children: object properties, or the single array element.
    pub fn children(&self) -> &[Property] {
        match self {
            Shape::Object { properties } => properties.as_deref().unwrap_or_default(),
            Shape::Array { items } => std::slice::from_ref(items.as_ref()),
            Shape::Scalar => &[],
        }
    }

    /// Named child properties, looking through an array into its element.
    pub fn named_properties(&self) -> &[Property] {
        match self {
            Shape::Object { properties } => properties.as_deref().unwrap_or_default(),
            Shape::Array { items } => items.shape.named_properties(),
            Shape::Scalar => &[],
        }
    }
}

/// How an entity can be referred to.
///
/// Entities with an explicit `id` are addressable by fully-qualified
/// locators. The synthesized dotted name path only serves shorthand lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Id(String),
    NamePath(String),
    #[default]
    Unnamed,
}

impl EntityKey {
    /// The explicit id, if this key is one.
    pub fn explicit_id(&self) -> Option<&str> {
        match self {
            EntityKey::Id(id) => Some(id),
            _ => None,
        }
    }
}

/// A table, view, or topic described by the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_granularity_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Vec<QualityRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authoritative_definitions: Option<Vec<AuthoritativeDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<Vec<CustomProperty>>,
    #[serde(skip)]
    pub key: EntityKey,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl SchemaObject {
    /// Top-level properties of an object-typed schema element.
    pub fn properties(&self) -> &[Property] {
        self.shape.named_properties()
    }

    pub fn relationships(&self) -> &[Relationship] {
        self.relationships.as_deref().unwrap_or_default()
    }
}

/// A field of a schema object, possibly nested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_type_options: Option<LogicalTypeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Data classification (public, restricted, confidential)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<bool>,
    /// 1-based position within a composite primary key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key_position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitioned: Option<bool>,
    /// 1-based position within the partition key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key_position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_data_element: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_name: Option<String>,
    /// Lineage: upstream objects this property is derived from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_source_objects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_logic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Vec<QualityRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authoritative_definitions: Option<Vec<AuthoritativeDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<Vec<CustomProperty>>,
    #[serde(skip)]
    pub key: EntityKey,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Property {
    pub fn is_primary_key(&self) -> bool {
        self.primary_key.unwrap_or(false)
    }

    pub fn is_partitioned(&self) -> bool {
        self.partitioned.unwrap_or(false)
    }

    pub fn relationships(&self) -> &[Relationship] {
        self.relationships.as_deref().unwrap_or_default()
    }
}

/// Options refining a logical type; the accepted keys depend on the type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogicalTypeOptions {
    String(StringOptions),
    Numeric(NumericOptions),
    Temporal(TemporalOptions),
    Array(ArrayOptions),
    Object(ObjectOptions),
    /// No or unknown logical type; every key is kept as-is
    Untyped(Extensions),
}

impl LogicalTypeOptions {
    /// Keys that do not belong to this variant.
    pub fn unknown_keys(&self) -> Vec<&str> {
        let extensions = match self {
            LogicalTypeOptions::String(o) => &o.extensions,
            LogicalTypeOptions::Numeric(o) => &o.extensions,
            LogicalTypeOptions::Temporal(o) => &o.extensions,
            LogicalTypeOptions::Array(o) => &o.extensions,
            LogicalTypeOptions::Object(o) => &o.extensions,
            LogicalTypeOptions::Untyped(_) => return Vec::new(),
        };
        extensions.keys().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timezone: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    /// Names of child properties that must be present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// One or several relationship endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Endpoint {
    Single(String),
    /// Composite key; positions pair up with the other side
    Composite(Vec<String>),
}

impl Endpoint {
    /// Endpoint strings in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Endpoint::Single(v) => vec![v.as_str()],
            Endpoint::Composite(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// A declared link between schema elements.
///
/// At schema level both `from` and `to` are required; at property level the
/// property itself is the source and `from` must be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Relationship kind; `foreignKey` when absent
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<Vec<CustomProperty>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Relationship {
    /// The declared kind, defaulting to a foreign key.
    pub fn kind(&self) -> &str {
        self.relationship_type.as_deref().unwrap_or("foreignKey")
    }
}

/// Comparison operators a library or SQL quality rule may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Between,
    NotBetween,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 8] = [
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterOrEqual,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessOrEqual,
        ComparisonOperator::Between,
        ComparisonOperator::NotBetween,
    ];

    /// Document key of the operator.
    pub fn key(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "mustBe",
            ComparisonOperator::NotEqual => "mustNotBe",
            ComparisonOperator::GreaterThan => "mustBeGreaterThan",
            ComparisonOperator::GreaterOrEqual => "mustBeGreaterOrEqualTo",
            ComparisonOperator::LessThan => "mustBeLessThan",
            ComparisonOperator::LessOrEqual => "mustBeLessOrEqualTo",
            ComparisonOperator::Between => "mustBeBetween",
            ComparisonOperator::NotBetween => "mustNotBeBetween",
        }
    }

    pub fn is_range(self) -> bool {
        matches!(
            self,
            ComparisonOperator::Between | ComparisonOperator::NotBetween
        )
    }
}

/// A declarative or custom data quality assertion.
///
/// The fields of every variant (`library`, `sql`, `custom`, `text`) are kept
/// side by side so that mixing them can be diagnosed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Variant tag; `library` when absent
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Pre-v3.1.0 name of `metric`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_not_be: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_greater_than: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_greater_or_equal_to: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_less_than: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_less_or_equal_to: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_be_between: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_not_be_between: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authoritative_definitions: Option<Vec<AuthoritativeDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<Vec<CustomProperty>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl QualityRule {
    /// Variant tag, defaulting to `library`.
    pub fn variant(&self) -> &str {
        self.rule_type.as_deref().unwrap_or("library")
    }

    /// Metric name, falling back to the deprecated `rule` field.
    pub fn effective_metric(&self) -> Option<&str> {
        self.metric.as_deref().or(self.rule.as_deref())
    }

    /// Every comparison operator that is set, with its value.
    pub fn comparisons(&self) -> Vec<(ComparisonOperator, &Value)> {
        ComparisonOperator::ALL
            .into_iter()
            .filter_map(|op| self.comparison(op).map(|v| (op, v)))
            .collect()
    }

    pub fn comparison(&self, op: ComparisonOperator) -> Option<&Value> {
        match op {
            ComparisonOperator::Equal => self.must_be.as_ref(),
            ComparisonOperator::NotEqual => self.must_not_be.as_ref(),
            ComparisonOperator::GreaterThan => self.must_be_greater_than.as_ref(),
            ComparisonOperator::GreaterOrEqual => self.must_be_greater_or_equal_to.as_ref(),
            ComparisonOperator::LessThan => self.must_be_less_than.as_ref(),
            ComparisonOperator::LessOrEqual => self.must_be_less_or_equal_to.as_ref(),
            ComparisonOperator::Between => self.must_be_between.as_ref(),
            ComparisonOperator::NotBetween => self.must_not_be_between.as_ref(),
        }
    }
}

/// Where the data is served from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Server identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Platform type (postgres, snowflake, kafka, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub server_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<Vec<CustomProperty>>,
    /// Platform specific connection fields (host, port, database, ...)
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A service-level property.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_ext: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// The owning team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<TeamMember>>,
    /// Set when the document used the pre-v3.1.0 flat member list
    #[serde(skip)]
    pub legacy_list: bool,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by_username: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// An access role.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_level_approvers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_level_approvers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<Vec<CustomProperty>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A support channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportChannel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_url: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_amount: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A free-form key/value extension point defined by the standard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Link to an authoritative source (business definition, implementation, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoritativeDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub definition_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}
