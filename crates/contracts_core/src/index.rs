//! Id index over a built contract.
//!
//! The index never holds references into the contract. It maps explicit ids
//! to structural [`Address`]es, which are resolved against the contract on
//! demand with [`Contract::entity_at`].

use crate::{Contract, Property, SchemaObject};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One step down the schema tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase", tag = "step", content = "index")]
pub enum Step {
    /// Child property at a position of an object's `properties`
    Property(usize),
    /// The element definition of an array
    Items,
}

/// Structural address of a schema object or property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Address {
    /// Position in the contract's `schema` sequence
    pub schema: usize,
    /// Path from the schema object down to the entity
    pub steps: Vec<Step>,
}

impl Address {
    pub fn schema(position: usize) -> Self {
        Self {
            schema: position,
            steps: Vec::new(),
        }
    }

    pub fn child(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self {
            schema: self.schema,
            steps,
        }
    }

    /// The address one step up, `None` for a schema object.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.steps.split_last()?;
        Some(Self {
            schema: self.schema,
            steps: rest.to_vec(),
        })
    }

    pub fn is_schema_object(&self) -> bool {
        self.steps.is_empty()
    }

    /// Document path, e.g. `schema[1].properties[0].items`.
    pub fn document_path(&self) -> String {
        let mut path = format!("schema[{}]", self.schema);
        for step in &self.steps {
            match step {
                Step::Property(i) => path.push_str(&format!(".properties[{i}]")),
                Step::Items => path.push_str(".items"),
            }
        }
        path
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.document_path())
    }
}

/// Borrowed view of an addressed entity.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    SchemaObject(&'a SchemaObject),
    Property(&'a Property),
}

impl<'a> EntityRef<'a> {
    pub fn name(&self) -> Option<&'a str> {
        match self {
            EntityRef::SchemaObject(o) => o.name.as_deref(),
            EntityRef::Property(p) => p.name.as_deref(),
        }
    }
}

impl Contract {
    /// Looks up the entity at a structural address.
    pub fn entity_at(&self, address: &Address) -> Option<EntityRef<'_>> {
        let object = self.schema_objects().get(address.schema)?;
        let Some((first, rest)) = address.steps.split_first() else {
            return Some(EntityRef::SchemaObject(object));
        };
        let mut current = step_into(&object.shape, *first)?;
        for step in rest {
            current = step_into(&current.shape, *step)?;
        }
        Some(EntityRef::Property(current))
    }
}

fn step_into(shape: &crate::Shape, step: Step) -> Option<&Property> {
    match (shape, step) {
        (crate::Shape::Object { properties }, Step::Property(i)) => {
            properties.as_ref().and_then(|properties| properties.get(i))
        }
        (crate::Shape::Array { items }, Step::Items) => Some(items),
        _ => None,
    }
}

/// Explicit id → address map.
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    ids: HashMap<String, Address>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an id. When the id is already taken the existing address is
    /// kept and returned.
    pub fn insert(&mut self, id: impl Into<String>, address: Address) -> Option<Address> {
        let id = id.into();
        if let Some(existing) = self.ids.get(&id) {
            return Some(existing.clone());
        }
        self.ids.insert(id, address);
        None
    }

    pub fn get(&self, id: &str) -> Option<&Address> {
        self.ids.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_address_paths() {
        let address = Address::schema(1)
            .child(Step::Property(0))
            .child(Step::Items)
            .child(Step::Property(3));
        assert_eq!(
            address.document_path(),
            "schema[1].properties[0].items.properties[3]"
        );
        assert_eq!(
            address.parent().unwrap().document_path(),
            "schema[1].properties[0].items"
        );
        assert!(Address::schema(0).parent().is_none());
    }

    #[test]
    fn test_insert_keeps_first() {
        let mut index = IdIndex::new();
        assert!(index.insert("orders_tbl", Address::schema(0)).is_none());
        let existing = index.insert("orders_tbl", Address::schema(4));
        assert_eq!(existing, Some(Address::schema(0)));
        assert_eq!(index.get("orders_tbl"), Some(&Address::schema(0)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_entity_at() {
        let contract = Contract {
            schema: Some(vec![SchemaObject {
                name: Some("orders".to_string()),
                shape: Shape::Object {
                    properties: Some(vec![Property {
                        name: Some("id".to_string()),
                        ..Default::default()
                    }]),
                },
                ..Default::default()
            }]),
            ..Default::default()
        };

        let found = contract.entity_at(&Address::schema(0).child(Step::Property(0)));
        assert_eq!(found.and_then(|e| e.name()), Some("id"));
        assert!(contract
            .entity_at(&Address::schema(0).child(Step::Items))
            .is_none());
        assert!(contract.entity_at(&Address::schema(3)).is_none());
    }
}
