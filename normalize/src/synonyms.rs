//! Synonym dictionary: vendor labels known to mean a canonical property.

use crate::similarity::normalize_label;
use crate::{TableError, TableResult};
use serde::Deserialize;
use shipval_core::PropertyId;
use shipval_schema::SchemaStore;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SynonymFile {
    #[serde(default)]
    synonyms: BTreeMap<String, Vec<String>>,
}

/// Labels are matched after folding, so `PROP_DIA` and `prop-dia` are the same key.
#[derive(Debug, Default)]
pub struct SynonymTable {
    by_label: BTreeMap<String, PropertyId>,
    entries: BTreeMap<PropertyId, Vec<String>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `[synonyms] property = ["label", ...]`.
    pub fn from_toml(source: &str) -> TableResult<Self> {
        let file: SynonymFile =
            toml::from_str(source).map_err(|e| TableError::Parse(e.to_string()))?;
        let mut table = Self::new();
        for (property, labels) in file.synonyms {
            for label in labels {
                table.add(property.as_str(), &label)?;
            }
        }
        Ok(table)
    }

    pub fn add(&mut self, property: impl Into<PropertyId>, label: &str) -> TableResult<()> {
        let property = property.into();
        let key = normalize_label(label);
        if key.is_empty() {
            return Ok(());
        }
        if let Some(first) = self.by_label.get(&key) {
            if first != &property {
                return Err(TableError::DuplicateSynonym {
                    label: label.to_string(),
                    first: first.to_string(),
                    second: property.to_string(),
                });
            }
            return Ok(());
        }
        self.by_label.insert(key, property.clone());
        self.entries.entry(property).or_default().push(label.to_string());
        Ok(())
    }

    pub fn lookup(&self, label: &str) -> Option<&PropertyId> {
        self.by_label.get(&normalize_label(label))
    }

    pub fn synonyms_of(&self, property: &str) -> &[String] {
        self.entries.get(property).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    pub fn check_schema(&self, schema: &SchemaStore) -> TableResult<()> {
        match self.entries.keys().find(|p| schema.property(p.as_str()).is_none()) {
            Some(unknown) => Err(TableError::UnknownSynonymProperty(unknown.to_string())),
            None => Ok(()),
        }
    }
}
