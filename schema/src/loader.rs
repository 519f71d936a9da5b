//! TOML loading for the Schema Store.

use crate::{Cardinality, PropertyDef, PropertyRange, SchemaBuilder, SchemaError, SchemaResult, SchemaStore};
use serde::Deserialize;
use shipval_core::{ClassId, QuantityKind};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    version: String,
    #[serde(default)]
    quantity_kinds: BTreeMap<String, String>,
    #[serde(default)]
    classes: Vec<ClassEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassEntry {
    name: String,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    properties: Vec<PropertyEntry>,
    #[serde(default)]
    xor_groups: Vec<XorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertyEntry {
    id: String,
    range: RangeEntry,
    #[serde(default)]
    cardinality: Option<String>,
}

/// `range = { quantity = "power" }`, `range = { class = "Propeller" }`, ...
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RangeEntry {
    Quantity(String),
    Number(bool),
    Boolean(bool),
    Enumeration(Vec<String>),
    Text(bool),
    Class(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct XorEntry {
    name: String,
    members: Vec<String>,
}

impl From<RangeEntry> for PropertyRange {
    fn from(entry: RangeEntry) -> Self {
        match entry {
            RangeEntry::Quantity(kind) => PropertyRange::Quantity(QuantityKind::new(kind)),
            RangeEntry::Number(_) => PropertyRange::Number,
            RangeEntry::Boolean(_) => PropertyRange::Boolean,
            RangeEntry::Enumeration(members) => PropertyRange::Enumeration(members),
            RangeEntry::Text(_) => PropertyRange::Text,
            RangeEntry::Class(class) => PropertyRange::Class(ClassId::new(class)),
        }
    }
}

impl SchemaStore {
    /// Load a schema from TOML source.
    pub fn from_toml(source: &str) -> SchemaResult<SchemaStore> {
        let file: SchemaFile =
            toml::from_str(source).map_err(|e| SchemaError::Parse(e.to_string()))?;

        let mut builder = SchemaBuilder::new(file.version);
        for (kind, unit) in file.quantity_kinds {
            builder.quantity_kind(kind, unit);
        }

        for class in file.classes {
            let mut class_builder = builder.add_class(class.name);
            if let Some(parent) = class.extends {
                class_builder = class_builder.extends(parent);
            }
            for prop in class.properties {
                let cardinality = match prop.cardinality {
                    Some(text) => text.parse::<Cardinality>()?,
                    None => Cardinality::default(),
                };
                class_builder = class_builder.property(
                    PropertyDef::new(prop.id, prop.range.into()).with_cardinality(cardinality),
                );
            }
            for group in class.xor_groups {
                class_builder = class_builder.xor(group.name, group.members);
            }
            class_builder.done()?;
        }

        builder.build()
    }
}
