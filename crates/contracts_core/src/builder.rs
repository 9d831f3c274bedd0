//! Model builder: converts a generic document tree into a typed [`Contract`].
//!
//! The builder borrows the input tree and never modifies it. Problems are
//! split in two classes:
//!
//! - a wrong *container* (a section that should be a sequence, a sequence
//!   element that should be a mapping, ...) is fatal and returned as the
//!   `Err` diagnostic, because no reliable model can be built;
//! - a wrong *scalar* (e.g. `required: "yes"`), an object property without
//!   `properties` or an array without `items` is accumulated and the build
//!   continues.
//!
//! # Example
//!
//! ```rust
//! use contracts_core::build_contract;
//! use serde_json::json;
//!
//! let document = json!({
//!     "apiVersion": "v3.1.0",
//!     "kind": "DataContract",
//!     "schema": [{"name": "users", "logicalType": "object",
//!                 "properties": [{"name": "id", "logicalType": "integer"}]}]
//! });
//!
//! let built = build_contract(&document).expect("document is a mapping");
//! assert_eq!(built.contract.schema_objects()[0].properties().len(), 1);
//! ```

use crate::{
    child_path, index_path, Address, ArrayOptions, AuthoritativeDefinition, Contract,
    ContractDescription, CustomProperty, Diagnostic, DiagnosticCode, Endpoint, EntityKey,
    Extensions, IdIndex, LogicalType, LogicalTypeOptions, NumericOptions, ObjectOptions, Price,
    Property, QualityRule, Relationship, Role, SchemaObject, Server, Shape, SlaProperty, Step,
    StringOptions, SupportChannel, Team, TeamMember, TemporalOptions,
};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// Result of a build step; the error is the fatal structural diagnostic.
pub type BuildResult<T> = std::result::Result<T, Diagnostic>;

/// A contract together with its id index and the diagnostics raised while building it.
#[derive(Debug, Clone)]
pub struct BuiltContract {
    pub contract: Contract,
    pub index: IdIndex,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the typed model from a document tree.
///
/// Returns a single structural diagnostic when the tree is not a mapping or a
/// recognized section has the wrong container shape.
pub fn build_contract(document: &Value) -> BuildResult<BuiltContract> {
    let Value::Object(root) = document else {
        return Err(Diagnostic::structural(
            DiagnosticCode::NotAMapping,
            "",
            format!(
                "contract document must be a mapping, found {}",
                describe(document)
            ),
        ));
    };

    let mut builder = ModelBuilder::default();
    let contract = builder.build_root(root)?;

    Ok(BuiltContract {
        contract,
        index: builder.index,
        diagnostics: builder.diagnostics,
    })
}

/// Short description of a value's kind for messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Typed reader over one mapping of the tree.
///
/// Every key read is marked as taken; the remaining keys become the
/// entity's extensions. `null` values are left untaken so they survive a
/// round trip unchanged.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: String,
    taken: HashSet<&'static str>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Fields<'a> {
    fn new(map: &'a Map<String, Value>, path: impl Into<String>) -> Self {
        Self {
            map,
            path: path.into(),
            taken: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    fn key_path(&self, key: &str) -> String {
        child_path(&self.path, key)
    }

    fn has(&self, key: &str) -> bool {
        self.map.get(key).is_some_and(|v| !v.is_null())
    }

    fn take(&mut self, key: &'static str) -> Option<&'a Value> {
        let value = self.map.get(key)?;
        if value.is_null() {
            return None;
        }
        self.taken.insert(key);
        Some(value)
    }

    fn wrong_type(&mut self, key: &str, expected: &str, found: &Value) {
        let path = self.key_path(key);
        self.diagnostics.push(Diagnostic::field(
            DiagnosticCode::InvalidType,
            path,
            format!("'{key}' must be {expected}, found {}", describe(found)),
        ));
    }

    fn string(&mut self, key: &'static str) -> Option<String> {
        match self.take(key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.wrong_type(key, "a string", other);
                None
            }
        }
    }

    fn bool(&mut self, key: &'static str) -> Option<bool> {
        match self.take(key)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.wrong_type(key, "a boolean", other);
                None
            }
        }
    }

    fn integer(&mut self, key: &'static str) -> Option<i64> {
        let value = self.take(key)?;
        match value.as_i64() {
            Some(n) => Some(n),
            None => {
                self.wrong_type(key, "an integer", value);
                None
            }
        }
    }

    fn unsigned(&mut self, key: &'static str) -> Option<u64> {
        let value = self.take(key)?;
        match value.as_u64() {
            Some(n) => Some(n),
            None => {
                self.wrong_type(key, "a non-negative integer", value);
                None
            }
        }
    }

    fn number(&mut self, key: &'static str) -> Option<Number> {
        match self.take(key)? {
            Value::Number(n) => Some(n.clone()),
            other => {
                self.wrong_type(key, "a number", other);
                None
            }
        }
    }

    fn value(&mut self, key: &'static str) -> Option<Value> {
        self.take(key).cloned()
    }

    fn strings(&mut self, key: &'static str) -> Option<Vec<String>> {
        let value = self.take(key)?;
        let strings = value.as_array().and_then(|items| {
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        });
        if strings.is_none() {
            self.wrong_type(key, "a sequence of strings", value);
        }
        strings
    }

    /// A relationship endpoint: one string or a sequence of strings.
    fn endpoint(&mut self, key: &'static str) -> Option<Endpoint> {
        let value = self.take(key)?;
        match value {
            Value::String(s) => Some(Endpoint::Single(s.clone())),
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>();
                if values.is_none() {
                    self.wrong_type(key, "a string or a sequence of strings", value);
                }
                values.map(Endpoint::Composite)
            }
            other => {
                self.wrong_type(key, "a string or a sequence of strings", other);
                None
            }
        }
    }

    /// A nested mapping container.
    fn mapping(&mut self, key: &'static str) -> BuildResult<Option<&'a Map<String, Value>>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(Diagnostic::structural(
                DiagnosticCode::InvalidSectionShape,
                self.key_path(key),
                format!("'{key}' must be a mapping, found {}", describe(other)),
            )),
        }
    }

    /// A sequence of mappings, returned with each element's document path.
    fn sequence(
        &mut self,
        key: &'static str,
    ) -> BuildResult<Option<Vec<(&'a Map<String, Value>, String)>>> {
        let base = self.key_path(key);
        match self.take(key) {
            None => Ok(None),
            Some(Value::Array(items)) => mappings(items, &base).map(Some),
            Some(other) => Err(Diagnostic::structural(
                DiagnosticCode::InvalidSectionShape,
                base,
                format!("'{key}' must be a sequence, found {}", describe(other)),
            )),
        }
    }

    fn finish(self, sink: &mut Vec<Diagnostic>) -> Extensions {
        sink.extend(self.diagnostics);
        self.map
            .iter()
            .filter(|(key, _)| !self.taken.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

fn mappings<'a>(
    items: &'a [Value],
    base: &str,
) -> BuildResult<Vec<(&'a Map<String, Value>, String)>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = index_path(base, i);
            match item {
                Value::Object(map) => Ok((map, path)),
                other => Err(Diagnostic::structural(
                    DiagnosticCode::InvalidSectionShape,
                    path,
                    format!("sequence element must be a mapping, found {}", describe(other)),
                )),
            }
        })
        .collect()
}

/// Where a schema element sits; decides how a missing `properties` is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    SchemaObject,
    Property,
}

#[derive(Default)]
struct ModelBuilder {
    index: IdIndex,
    diagnostics: Vec<Diagnostic>,
}

type Mapping = Map<String, Value>;

impl ModelBuilder {
    fn list<T>(
        &mut self,
        fields: &mut Fields<'_>,
        key: &'static str,
        mut build: impl FnMut(&mut Self, &Mapping, &str, usize) -> BuildResult<T>,
    ) -> BuildResult<Option<Vec<T>>> {
        let Some(entries) = fields.sequence(key)? else {
            return Ok(None);
        };
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (map, path))| build(self, map, &path, i))
            .collect::<BuildResult<Vec<_>>>()
            .map(Some)
    }

    fn build_root(&mut self, root: &Mapping) -> BuildResult<Contract> {
        let mut f = Fields::new(root, "");

        let api_version = f.string("apiVersion");
        let kind = f.string("kind");
        let id = f.string("id");
        let version = f.string("version");
        let status = f.string("status");
        let name = f.string("name");
        let tenant = f.string("tenant");
        let domain = f.string("domain");
        let data_product = f.string("dataProduct");
        let tags = f.strings("tags");
        let description = self.build_root_description(&mut f)?;
        let schema = self.list(&mut f, "schema", |b, m, p, i| b.build_schema_object(m, p, i))?;
        let quality = self.list(&mut f, "quality", |b, m, p, _| b.build_quality_rule(m, p))?;
        let servers = self.list(&mut f, "servers", |b, m, p, _| b.build_server(m, p))?;
        let sla_default_element = f.string("slaDefaultElement");
        let sla_properties =
            self.list(&mut f, "slaProperties", |b, m, p, _| b.build_sla_property(m, p))?;
        let team = self.build_team(&mut f)?;
        let roles = self.list(&mut f, "roles", |b, m, p, _| b.build_role(m, p))?;
        let support = self.list(&mut f, "support", |b, m, p, _| b.build_support(m, p))?;
        let price = match f.mapping("price")? {
            Some(map) => Some(self.build_price(map, &child_path("", "price"))),
            None => None,
        };
        let authoritative_definitions = self.list(&mut f, "authoritativeDefinitions", |b, m, p, _| {
            Ok(b.build_authoritative_definition(m, p))
        })?;
        let custom_properties = self.list(&mut f, "customProperties", |b, m, p, _| {
            Ok(b.build_custom_property(m, p))
        })?;
        let contract_created_ts = f.string("contractCreatedTs");

        let extensions = f.finish(&mut self.diagnostics);

        Ok(Contract {
            api_version,
            kind,
            id,
            version,
            status,
            name,
            tenant,
            domain,
            data_product,
            tags,
            description,
            schema,
            quality,
            servers,
            sla_default_element,
            sla_properties,
            team,
            roles,
            support,
            price,
            authoritative_definitions,
            custom_properties,
            contract_created_ts,
            extensions,
        })
    }

    fn build_root_description(
        &mut self,
        f: &mut Fields<'_>,
    ) -> BuildResult<Option<ContractDescription>> {
        // A plain string is a common mistake; report it without giving up on the document.
        let root = f.map;
        if let Some(value @ Value::String(_)) = root.get("description") {
            f.take("description");
            f.wrong_type("description", "a mapping", value);
            return Ok(None);
        }
        let Some(map) = f.mapping("description")? else {
            return Ok(None);
        };

        let mut d = Fields::new(map, "description");
        let purpose = d.string("purpose");
        let limitations = d.string("limitations");
        let usage = d.string("usage");
        let authoritative_definitions = self.list(&mut d, "authoritativeDefinitions", |b, m, p, _| {
            Ok(b.build_authoritative_definition(m, p))
        })?;
        let custom_properties = self.list(&mut d, "customProperties", |b, m, p, _| {
            Ok(b.build_custom_property(m, p))
        })?;
        let extensions = d.finish(&mut self.diagnostics);

        Ok(Some(ContractDescription {
            purpose,
            limitations,
            usage,
            authoritative_definitions,
            custom_properties,
            extensions,
        }))
    }

    /// Records an entity's key and its explicit id in the index.
    fn register(
        &mut self,
        id: Option<&str>,
        name_path: Option<String>,
        address: &Address,
        path: &str,
    ) -> EntityKey {
        if let Some(id) = id {
            if let Some(first) = self.index.insert(id, address.clone()) {
                self.diagnostics.push(Diagnostic::field(
                    DiagnosticCode::DuplicateId,
                    child_path(path, "id"),
                    format!("id '{id}' is already declared at {first}"),
                ));
            }
            return EntityKey::Id(id.to_string());
        }
        match name_path {
            Some(name_path) => EntityKey::NamePath(name_path),
            None => EntityKey::Unnamed,
        }
    }

    fn build_schema_object(
        &mut self,
        map: &Mapping,
        path: &str,
        position: usize,
    ) -> BuildResult<SchemaObject> {
        let mut f = Fields::new(map, path);
        let address = Address::schema(position);

        let name = f.string("name");
        let id = f.string("id");
        let logical_type = f.string("logicalType");
        let physical_type = f.string("physicalType");
        let physical_name = f.string("physicalName");
        let business_name = f.string("businessName");
        let description = f.string("description");
        let data_granularity_description = f.string("dataGranularityDescription");
        let tags = f.strings("tags");

        let key = self.register(id.as_deref(), name.clone(), &address, path);
        let name_path = name.clone().unwrap_or_default();
        let shape = self.build_shape(
            &mut f,
            logical_type.as_deref(),
            &address,
            &name_path,
            Level::SchemaObject,
        )?;

        let relationships =
            self.list(&mut f, "relationships", |b, m, p, _| b.build_relationship(m, p))?;
        let quality = self.list(&mut f, "quality", |b, m, p, _| b.build_quality_rule(m, p))?;
        let authoritative_definitions = self.list(&mut f, "authoritativeDefinitions", |b, m, p, _| {
            Ok(b.build_authoritative_definition(m, p))
        })?;
        let custom_properties = self.list(&mut f, "customProperties", |b, m, p, _| {
            Ok(b.build_custom_property(m, p))
        })?;
        let extensions = f.finish(&mut self.diagnostics);

        Ok(SchemaObject {
            name,
            id,
            logical_type,
            physical_type,
            physical_name,
            business_name,
            description,
            data_granularity_description,
            tags,
            shape,
            relationships,
            quality,
            authoritative_definitions,
            custom_properties,
            key,
            extensions,
        })
    }

    /// Builds the closed nesting variant of a schema element.
    ///
    /// `object` requires a `properties` sequence and `array` requires an
    /// `items` mapping. Without a logical type the shape is inferred from
    /// whichever of the two keys is present.
    fn build_shape(
        &mut self,
        f: &mut Fields<'_>,
        logical_type: Option<&str>,
        address: &Address,
        name_path: &str,
        level: Level,
    ) -> BuildResult<Shape> {
        let tag = match logical_type {
            Some(tag) => LogicalType::from_tag(tag),
            None if f.has("properties") => Some(LogicalType::Object),
            None if f.has("items") => Some(LogicalType::Array),
            None => None,
        };

        match tag {
            Some(LogicalType::Object) => {
                let Some(entries) = f.sequence("properties")? else {
                    let path = f.key_path("properties");
                    let message = "object type requires a 'properties' sequence";
                    self.diagnostics.push(match level {
                        Level::SchemaObject => Diagnostic::warning(
                            DiagnosticCode::ObjectWithoutProperties,
                            path,
                            message,
                        ),
                        Level::Property => Diagnostic::field(
                            DiagnosticCode::ObjectWithoutProperties,
                            path,
                            message,
                        ),
                    });
                    return Ok(Shape::Object { properties: None });
                };

                let properties = entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, (map, path))| {
                        let child_address = address.child(Step::Property(i));
                        self.build_property(map, &path, &child_address, name_path)
                    })
                    .collect::<BuildResult<Vec<_>>>()?;
                Ok(Shape::Object {
                    properties: Some(properties),
                })
            }
            Some(LogicalType::Array) => {
                let Some(items) = f.mapping("items")? else {
                    let path = f.key_path("items");
                    self.diagnostics.push(Diagnostic::field(
                        DiagnosticCode::ArrayWithoutItems,
                        path,
                        "array type requires exactly one 'items' element definition",
                    ));
                    return Ok(Shape::Scalar);
                };
                let items_path = f.key_path("items");
                let item = self.build_items(items, &items_path, &address.child(Step::Items), name_path)?;
                Ok(Shape::Array {
                    items: Box::new(item),
                })
            }
            _ => Ok(Shape::Scalar),
        }
    }

    fn build_property(
        &mut self,
        map: &Mapping,
        path: &str,
        address: &Address,
        parent_name_path: &str,
    ) -> BuildResult<Property> {
        let name = map.get("name").and_then(Value::as_str);
        let name_path = name.map(|n| format!("{parent_name_path}.{n}"));
        self.build_property_at(map, path, address, name_path)
    }

    /// The element definition of an array; shares the array's name path.
    fn build_items(
        &mut self,
        map: &Mapping,
        path: &str,
        address: &Address,
        name_path: &str,
    ) -> BuildResult<Property> {
        self.build_property_at(map, path, address, Some(name_path.to_string()))
    }

    fn build_property_at(
        &mut self,
        map: &Mapping,
        path: &str,
        address: &Address,
        name_path: Option<String>,
    ) -> BuildResult<Property> {
        let mut f = Fields::new(map, path);

        let name = f.string("name");
        let id = f.string("id");
        let logical_type = f.string("logicalType");
        let logical_type_options = match f.mapping("logicalTypeOptions")? {
            Some(options) => Some(self.build_logical_type_options(
                options,
                &f.key_path("logicalTypeOptions"),
                logical_type.as_deref(),
            )),
            None => None,
        };
        let physical_type = f.string("physicalType");
        let physical_name = f.string("physicalName");
        let business_name = f.string("businessName");
        let description = f.string("description");
        let classification = f.string("classification");
        let required = f.bool("required");
        let unique = f.bool("unique");
        let primary_key = f.bool("primaryKey");
        let primary_key_position = f.integer("primaryKeyPosition");
        let partitioned = f.bool("partitioned");
        let partition_key_position = f.integer("partitionKeyPosition");
        let critical_data_element = f.bool("criticalDataElement");
        let encrypted_name = f.string("encryptedName");
        let transform_source_objects = f.strings("transformSourceObjects");
        let transform_logic = f.string("transformLogic");
        let transform_description = f.string("transformDescription");
        let examples = match f.take("examples") {
            Some(Value::Array(items)) => Some(items.clone()),
            Some(other) => {
                f.wrong_type("examples", "a sequence", other);
                None
            }
            None => None,
        };
        let tags = f.strings("tags");

        let key = self.register(id.as_deref(), name_path.clone(), address, path);
        let shape = self.build_shape(
            &mut f,
            logical_type.as_deref(),
            address,
            name_path.as_deref().unwrap_or_default(),
            Level::Property,
        )?;

        let relationships =
            self.list(&mut f, "relationships", |b, m, p, _| b.build_relationship(m, p))?;
        let quality = self.list(&mut f, "quality", |b, m, p, _| b.build_quality_rule(m, p))?;
        let authoritative_definitions = self.list(&mut f, "authoritativeDefinitions", |b, m, p, _| {
            Ok(b.build_authoritative_definition(m, p))
        })?;
        let custom_properties = self.list(&mut f, "customProperties", |b, m, p, _| {
            Ok(b.build_custom_property(m, p))
        })?;
        let extensions = f.finish(&mut self.diagnostics);

        Ok(Property {
            name,
            id,
            logical_type,
            logical_type_options,
            physical_type,
            physical_name,
            business_name,
            description,
            classification,
            required,
            unique,
            primary_key,
            primary_key_position,
            partitioned,
            partition_key_position,
            critical_data_element,
            encrypted_name,
            transform_source_objects,
            transform_logic,
            transform_description,
            examples,
            tags,
            shape,
            relationships,
            quality,
            authoritative_definitions,
            custom_properties,
            key,
            extensions,
        })
    }

    fn build_logical_type_options(
        &mut self,
        map: &Mapping,
        path: &str,
        logical_type: Option<&str>,
    ) -> LogicalTypeOptions {
        let mut f = Fields::new(map, path);
        let mut options = match logical_type.and_then(LogicalType::from_tag) {
            Some(LogicalType::String) => LogicalTypeOptions::String(StringOptions {
                min_length: f.unsigned("minLength"),
                max_length: f.unsigned("maxLength"),
                pattern: f.string("pattern"),
                format: f.string("format"),
                ..Default::default()
            }),
            Some(LogicalType::Number | LogicalType::Integer) => {
                LogicalTypeOptions::Numeric(NumericOptions {
                    minimum: f.number("minimum"),
                    maximum: f.number("maximum"),
                    exclusive_minimum: f.value("exclusiveMinimum"),
                    exclusive_maximum: f.value("exclusiveMaximum"),
                    multiple_of: f.number("multipleOf"),
                    format: f.string("format"),
                    ..Default::default()
                })
            }
            Some(LogicalType::Date | LogicalType::Timestamp | LogicalType::Time) => {
                LogicalTypeOptions::Temporal(TemporalOptions {
                    format: f.string("format"),
                    minimum: f.value("minimum"),
                    maximum: f.value("maximum"),
                    exclusive_minimum: f.value("exclusiveMinimum"),
                    exclusive_maximum: f.value("exclusiveMaximum"),
                    timezone: f.bool("timezone"),
                    default_timezone: f.string("defaultTimezone"),
                    ..Default::default()
                })
            }
            Some(LogicalType::Array) => LogicalTypeOptions::Array(ArrayOptions {
                min_items: f.unsigned("minItems"),
                max_items: f.unsigned("maxItems"),
                unique_items: f.bool("uniqueItems"),
                ..Default::default()
            }),
            Some(LogicalType::Object) => LogicalTypeOptions::Object(ObjectOptions {
                min_properties: f.unsigned("minProperties"),
                max_properties: f.unsigned("maxProperties"),
                required: f.strings("required"),
                ..Default::default()
            }),
            Some(LogicalType::Boolean) | None => LogicalTypeOptions::Untyped(Extensions::new()),
        };

        let rest = f.finish(&mut self.diagnostics);
        match &mut options {
            LogicalTypeOptions::String(o) => o.extensions = rest,
            LogicalTypeOptions::Numeric(o) => o.extensions = rest,
            LogicalTypeOptions::Temporal(o) => o.extensions = rest,
            LogicalTypeOptions::Array(o) => o.extensions = rest,
            LogicalTypeOptions::Object(o) => o.extensions = rest,
            LogicalTypeOptions::Untyped(keys) => *keys = rest,
        }
        options
    }

    fn build_relationship(&mut self, map: &Mapping, path: &str) -> BuildResult<Relationship> {
        let mut f = Fields::new(map, path);
        let relationship_type = f.string("type");
        let from = f.endpoint("from");
        let to = f.endpoint("to");
        let custom_properties = self.list(&mut f, "customProperties", |b, m, p, _| {
            Ok(b.build_custom_property(m, p))
        })?;
        let extensions = f.finish(&mut self.diagnostics);

        Ok(Relationship {
            relationship_type,
            from,
            to,
            custom_properties,
            extensions,
        })
    }

    fn build_quality_rule(&mut self, map: &Mapping, path: &str) -> BuildResult<QualityRule> {
        let mut f = Fields::new(map, path);
        let id = f.string("id");
        let name = f.string("name");
        let description = f.string("description");
        let rule_type = f.string("type");
        let dimension = f.string("dimension");
        let severity = f.string("severity");
        let unit = f.string("unit");
        let metric = f.string("metric");
        let rule = f.string("rule");
        let arguments = f.value("arguments");
        let query = f.string("query");
        let engine = f.string("engine");
        let implementation = f.value("implementation");
        let must_be = f.value("mustBe");
        let must_not_be = f.value("mustNotBe");
        let must_be_greater_than = f.value("mustBeGreaterThan");
        let must_be_greater_or_equal_to = f.value("mustBeGreaterOrEqualTo");
        let must_be_less_than = f.value("mustBeLessThan");
        let must_be_less_or_equal_to = f.value("mustBeLessOrEqualTo");
        let must_be_between = f.value("mustBeBetween");
        let must_not_be_between = f.value("mustNotBeBetween");
        let method = f.string("method");
        let scheduler = f.string("scheduler");
        let schedule = f.string("schedule");
        let business_impact = f.string("businessImpact");
        let tags = f.strings("tags");
        let authoritative_definitions = self.list(&mut f, "authoritativeDefinitions", |b, m, p, _| {
            Ok(b.build_authoritative_definition(m, p))
        })?;
        let custom_properties = self.list(&mut f, "customProperties", |b, m, p, _| {
            Ok(b.build_custom_property(m, p))
        })?;
        let extensions = f.finish(&mut self.diagnostics);

        Ok(QualityRule {
            id,
            name,
            description,
            rule_type,
            dimension,
            severity,
            unit,
            metric,
            rule,
            arguments,
            query,
            engine,
            implementation,
            must_be,
            must_not_be,
            must_be_greater_than,
            must_be_greater_or_equal_to,
            must_be_less_than,
            must_be_less_or_equal_to,
            must_be_between,
            must_not_be_between,
            method,
            scheduler,
            schedule,
            business_impact,
            tags,
            authoritative_definitions,
            custom_properties,
            extensions,
        })
    }

    fn build_server(&mut self, map: &Mapping, path: &str) -> BuildResult<Server> {
        let mut f = Fields::new(map, path);
        let server = f.string("server");
        let server_type = f.string("type");
        let description = f.string("description");
        let environment = f.string("environment");
        let roles = self.list(&mut f, "roles", |b, m, p, _| b.build_role(m, p))?;
        let custom_properties = self.list(&mut f, "customProperties", |b, m, p, _| {
            Ok(b.build_custom_property(m, p))
        })?;
        let extensions = f.finish(&mut self.diagnostics);

        Ok(Server {
            server,
            server_type,
            description,
            environment,
            roles,
            custom_properties,
            extensions,
        })
    }

    fn build_sla_property(&mut self, map: &Mapping, path: &str) -> BuildResult<SlaProperty> {
        let mut f = Fields::new(map, path);
        let sla = SlaProperty {
            id: f.string("id"),
            property: f.string("property"),
            value: f.value("value"),
            value_ext: f.value("valueExt"),
            unit: f.string("unit"),
            element: f.string("element"),
            driver: f.string("driver"),
            description: f.string("description"),
            scheduler: f.string("scheduler"),
            schedule: f.string("schedule"),
            extensions: Extensions::new(),
        };
        Ok(SlaProperty {
            extensions: f.finish(&mut self.diagnostics),
            ..sla
        })
    }

    /// Reads `team` in either form.
    ///
    /// The pre-v3.1.0 flat member list is normalized into the object form with
    /// `legacy_list` set; the input tree itself is left untouched.
    fn build_team(&mut self, f: &mut Fields<'_>) -> BuildResult<Option<Team>> {
        let root = f.map;
        match root.get("team") {
            Some(Value::Array(items)) => {
                f.take("team");
                let members = mappings(items, "team")?
                    .into_iter()
                    .map(|(map, path)| self.build_team_member(map, &path))
                    .collect();
                Ok(Some(Team {
                    members: Some(members),
                    legacy_list: true,
                    ..Default::default()
                }))
            }
            _ => {
                let Some(map) = f.mapping("team")? else {
                    return Ok(None);
                };
                let mut t = Fields::new(map, "team");
                let name = t.string("name");
                let description = t.string("description");
                let members = self.list(&mut t, "members", |b, m, p, _| {
                    Ok(b.build_team_member(m, p))
                })?;
                let extensions = t.finish(&mut self.diagnostics);
                Ok(Some(Team {
                    name,
                    description,
                    members,
                    legacy_list: false,
                    extensions,
                }))
            }
        }
    }

    fn build_team_member(&mut self, map: &Mapping, path: &str) -> TeamMember {
        let mut f = Fields::new(map, path);
        let member = TeamMember {
            username: f.string("username"),
            name: f.string("name"),
            description: f.string("description"),
            role: f.string("role"),
            date_in: f.string("dateIn"),
            date_out: f.string("dateOut"),
            replaced_by_username: f.string("replacedByUsername"),
            extensions: Extensions::new(),
        };
        TeamMember {
            extensions: f.finish(&mut self.diagnostics),
            ..member
        }
    }

    fn build_role(&mut self, map: &Mapping, path: &str) -> BuildResult<Role> {
        let mut f = Fields::new(map, path);
        let role = f.string("role");
        let description = f.string("description");
        let access = f.string("access");
        let first_level_approvers = f.string("firstLevelApprovers");
        let second_level_approvers = f.string("secondLevelApprovers");
        let custom_properties = self.list(&mut f, "customProperties", |b, m, p, _| {
            Ok(b.build_custom_property(m, p))
        })?;
        let extensions = f.finish(&mut self.diagnostics);

        Ok(Role {
            role,
            description,
            access,
            first_level_approvers,
            second_level_approvers,
            custom_properties,
            extensions,
        })
    }

    fn build_support(&mut self, map: &Mapping, path: &str) -> BuildResult<SupportChannel> {
        let mut f = Fields::new(map, path);
        let channel = SupportChannel {
            channel: f.string("channel"),
            url: f.string("url"),
            description: f.string("description"),
            tool: f.string("tool"),
            scope: f.string("scope"),
            invitation_url: f.string("invitationUrl"),
            extensions: Extensions::new(),
        };
        Ok(SupportChannel {
            extensions: f.finish(&mut self.diagnostics),
            ..channel
        })
    }

    fn build_price(&mut self, map: &Mapping, path: &str) -> Price {
        let mut f = Fields::new(map, path);
        let price = Price {
            price_amount: f.number("priceAmount"),
            price_currency: f.string("priceCurrency"),
            price_unit: f.string("priceUnit"),
            extensions: Extensions::new(),
        };
        Price {
            extensions: f.finish(&mut self.diagnostics),
            ..price
        }
    }

    fn build_custom_property(&mut self, map: &Mapping, path: &str) -> CustomProperty {
        let mut f = Fields::new(map, path);
        let property = CustomProperty {
            property: f.string("property"),
            value: f.value("value"),
            description: f.string("description"),
            extensions: Extensions::new(),
        };
        CustomProperty {
            extensions: f.finish(&mut self.diagnostics),
            ..property
        }
    }

    fn build_authoritative_definition(
        &mut self,
        map: &Mapping,
        path: &str,
    ) -> AuthoritativeDefinition {
        let mut f = Fields::new(map, path);
        let definition = AuthoritativeDefinition {
            url: f.string("url"),
            definition_type: f.string("type"),
            description: f.string("description"),
            extensions: Extensions::new(),
        };
        AuthoritativeDefinition {
            extensions: f.finish(&mut self.diagnostics),
            ..definition
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiagnosticKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn build(document: Value) -> BuiltContract {
        build_contract(&document).expect("document should build")
    }

    fn codes(built: &BuiltContract) -> Vec<DiagnosticCode> {
        built.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_not_a_mapping() {
        let err = build_contract(&json!(["not", "a", "contract"])).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::NotAMapping);
        assert_eq!(err.kind, DiagnosticKind::Structural);
        assert_eq!(err.path, "");
    }

    #[test]
    fn test_schema_must_be_sequence() {
        let err = build_contract(&json!({"schema": {"name": "users"}})).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::InvalidSectionShape);
        assert_eq!(err.path, "schema");
    }

    #[test]
    fn test_schema_element_must_be_mapping() {
        let err = build_contract(&json!({"schema": ["users"]})).unwrap_err();
        assert_eq!(err.path, "schema[0]");
    }

    #[test]
    fn test_nested_properties_shape_is_structural() {
        let err = build_contract(&json!({
            "schema": [{"name": "users", "logicalType": "object",
                        "properties": [{"name": "address", "logicalType": "object", "properties": "street"}]}]
        }))
        .unwrap_err();
        assert_eq!(err.path, "schema[0].properties[0].properties");
    }

    #[test]
    fn test_unknown_top_level_keys_preserved() {
        let built = build(json!({"apiVersion": "v3.1.0", "x-owner-slack": "#data"}));
        assert_eq!(
            built.contract.extensions.get("x-owner-slack"),
            Some(&json!("#data"))
        );
        assert!(built.diagnostics.is_empty());
    }

    #[test]
    fn test_wrong_scalar_type_is_field_error() {
        let built = build(json!({
            "schema": [{"name": "users", "logicalType": "object",
                        "properties": [{"name": "id", "required": "yes"}]}]
        }));
        assert_eq!(codes(&built), vec![DiagnosticCode::InvalidType]);
        assert_eq!(
            built.diagnostics[0].path,
            "schema[0].properties[0].required"
        );
        assert_eq!(built.contract.schema_objects()[0].properties()[0].required, None);
    }

    #[test]
    fn test_object_property_requires_properties() {
        let built = build(json!({
            "schema": [{"name": "users", "logicalType": "object",
                        "properties": [{"name": "address", "logicalType": "object"}]}]
        }));
        assert_eq!(codes(&built), vec![DiagnosticCode::ObjectWithoutProperties]);
        assert!(built.diagnostics[0].is_error());
    }

    #[test]
    fn test_object_schema_without_properties_warns() {
        let built = build(json!({"schema": [{"name": "users", "logicalType": "object"}]}));
        assert_eq!(codes(&built), vec![DiagnosticCode::ObjectWithoutProperties]);
        assert!(built.diagnostics[0].is_warning());
        assert_eq!(
            built.contract.to_document().unwrap(),
            json!({"schema": [{"name": "users", "logicalType": "object"}]})
        );
    }

    #[test]
    fn test_empty_properties_kept_distinct_from_absent() {
        let document = json!({"schema": [{"name": "t", "logicalType": "object", "properties": []}]});
        let built = build(document.clone());
        assert!(built.diagnostics.is_empty(), "{:?}", built.diagnostics);
        assert_eq!(built.contract.to_document().unwrap(), document);
    }

    #[test]
    fn test_array_requires_items() {
        let built = build(json!({
            "schema": [{"name": "users", "logicalType": "object",
                        "properties": [{"name": "emails", "logicalType": "array"}]}]
        }));
        assert_eq!(codes(&built), vec![DiagnosticCode::ArrayWithoutItems]);
        assert_eq!(
            built.diagnostics[0].path,
            "schema[0].properties[0].items"
        );
    }

    #[test]
    fn test_recursive_shapes_and_keys() {
        let built = build(json!({
            "schema": [{
                "name": "orders", "id": "orders_tbl", "logicalType": "object",
                "properties": [
                    {"name": "id", "id": "order_id", "logicalType": "integer"},
                    {"name": "lines", "logicalType": "array", "items": {
                        "logicalType": "object",
                        "properties": [{"name": "sku", "logicalType": "string"}]
                    }}
                ]
            }]
        }));
        assert!(built.diagnostics.is_empty());

        let orders = &built.contract.schema_objects()[0];
        assert_eq!(orders.key, EntityKey::Id("orders_tbl".to_string()));
        let lines = &orders.properties()[1];
        assert_eq!(lines.key, EntityKey::NamePath("orders.lines".to_string()));
        let Shape::Array { items } = &lines.shape else {
            panic!("lines should be an array");
        };
        assert_eq!(
            items.shape.children()[0].key,
            EntityKey::NamePath("orders.lines.sku".to_string())
        );

        assert_eq!(built.index.len(), 2);
        assert_eq!(
            built.index.get("order_id"),
            Some(&Address::schema(0).child(Step::Property(0)))
        );
        // synthesized name paths never enter the id map
        assert!(!built.index.contains("orders.lines"));
    }

    #[test]
    fn test_duplicate_ids() {
        let built = build(json!({
            "schema": [
                {"name": "a", "id": "dup", "logicalType": "object", "properties": [{"name": "x"}]},
                {"name": "b", "id": "dup", "logicalType": "object", "properties": [{"name": "y"}]}
            ]
        }));
        assert_eq!(codes(&built), vec![DiagnosticCode::DuplicateId]);
        assert_eq!(built.diagnostics[0].path, "schema[1].id");
    }

    #[test]
    fn test_logical_type_options_variant() {
        let built = build(json!({
            "schema": [{"name": "users", "logicalType": "object", "properties": [
                {"name": "email", "logicalType": "string",
                 "logicalTypeOptions": {"maxLength": 255, "pattern": "^.+@.+$", "precision": 3}}
            ]}]
        }));
        let email = &built.contract.schema_objects()[0].properties()[0];
        let Some(LogicalTypeOptions::String(options)) = &email.logical_type_options else {
            panic!("expected string options");
        };
        assert_eq!(options.max_length, Some(255));
        assert_eq!(email.logical_type_options.as_ref().unwrap().unknown_keys(), vec!["precision"]);
    }

    #[test]
    fn test_legacy_team_list_is_normalized_without_touching_input() {
        let document = json!({
            "team": [{"username": "ceastwood", "role": "Data Scientist"}]
        });
        let before = document.clone();
        let built = build_contract(&document).unwrap();

        assert_eq!(document, before);
        let team = built.contract.team.as_ref().unwrap();
        assert!(team.legacy_list);
        assert_eq!(team.members.as_ref().unwrap()[0].username.as_deref(), Some("ceastwood"));

        let derived = built.contract.to_document().unwrap();
        assert_eq!(
            derived,
            json!({"team": {"members": [{"username": "ceastwood", "role": "Data Scientist"}]}})
        );
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let document = json!({
            "apiVersion": "v3.1.0",
            "kind": "DataContract",
            "id": "53581432-6c55-4ba2-a65f-72344a91553a",
            "version": "1.0.0",
            "status": "active",
            "name": "orders",
            "tags": ["sales"],
            "description": {"purpose": "Orders", "usage": "Analytics"},
            "schema": [{
                "name": "orders", "id": "orders_tbl", "logicalType": "object",
                "physicalType": "table", "x-retention": 30,
                "properties": [
                    {"name": "order_id", "logicalType": "string", "primaryKey": true,
                     "primaryKeyPosition": 1, "required": true, "classification": "public",
                     "logicalTypeOptions": {"maxLength": 36},
                     "relationships": [{"to": "customers.id"}],
                     "quality": [{"metric": "nullValues", "mustBe": 0, "dimension": "completeness"}]},
                    {"name": "tags", "logicalType": "array", "items": {"logicalType": "string"}},
                    {"name": "note", "description": null}
                ],
                "relationships": [{"type": "foreignKey", "from": ["orders.a", "orders.b"], "to": ["c.a", "c.b"]}]
            }, {
                "name": "audit", "logicalType": "object", "properties": []
            }],
            "servers": [{"server": "prod", "type": "postgres", "environment": "prod", "host": "db", "port": 5432}],
            "slaDefaultElement": "orders.order_id",
            "slaProperties": [{"property": "latency", "value": 4, "unit": "d"}],
            "team": {"name": "sales-data", "members": [{"username": "a@b.c"}]},
            "roles": [{"role": "reader", "access": "read"}],
            "support": [{"channel": "#orders", "tool": "slack"}],
            "price": {"priceAmount": 9.95, "priceCurrency": "USD", "priceUnit": "megabyte"},
            "customProperties": [{"property": "owner", "value": "sales"}],
            "contractCreatedTs": "2024-01-01T00:00:00Z",
            "x-extra": {"nested": true}
        });

        let built = build_contract(&document).unwrap();
        assert!(built.diagnostics.is_empty(), "{:?}", built.diagnostics);
        assert_eq!(built.contract.to_document().unwrap(), document);
    }
}
