//! The Schema Store - immutable schema lookup.

use crate::{
    ClassDef, ClassHierarchy, PropertyDef, PropertyPath, SchemaError, SchemaResult, XorGroup,
};
use shipval_core::{ClassId, PropertyId, QuantityKind};
use std::collections::BTreeMap;

/// The Schema Store provides lookup of class and property definitions.
/// It is immutable after construction; a new version is a new instance.
#[derive(Debug)]
pub struct SchemaStore {
    version: String,
    /// Canonical unit symbol per quantity kind.
    quantity_kinds: BTreeMap<QuantityKind, String>,
    classes: BTreeMap<ClassId, ClassDef>,
    properties: BTreeMap<PropertyId, PropertyDef>,
    hierarchy: ClassHierarchy,
}

impl SchemaStore {
    pub(crate) fn new(
        version: String,
        quantity_kinds: BTreeMap<QuantityKind, String>,
        classes: BTreeMap<ClassId, ClassDef>,
        properties: BTreeMap<PropertyId, PropertyDef>,
        hierarchy: ClassHierarchy,
    ) -> Self {
        Self {
            version,
            quantity_kinds,
            classes,
            properties,
            hierarchy,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    // ==================== Quantity Kinds ====================

    /// Get the canonical unit for a quantity kind.
    pub fn canonical_unit(&self, kind: &str) -> Option<&str> {
        self.quantity_kinds.get(kind).map(String::as_str)
    }

    /// All quantity kinds with their canonical units.
    pub fn quantity_kinds(&self) -> impl Iterator<Item = (&QuantityKind, &str)> {
        self.quantity_kinds.iter().map(|(k, u)| (k, u.as_str()))
    }

    // ==================== Class Lookups ====================

    pub fn class(&self, id: &str) -> Option<&ClassDef> {
        self.classes.get(id)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.values()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Check whether `class` is `ancestor` or one of its subclasses.
    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.hierarchy.is_subclass_of(class, ancestor)
    }

    /// The class and all its subclasses.
    pub fn descendants(&self, class: &str) -> impl Iterator<Item = &ClassId> {
        self.hierarchy.descendants(class)
    }

    /// XOR groups of a class, including inherited ones.
    pub fn xor_groups(&self, class: &str) -> Vec<&XorGroup> {
        self.hierarchy
            .lineage(class)
            .iter()
            .filter_map(|c| self.classes.get(c))
            .flat_map(|c| c.xor_groups.iter())
            .collect()
    }

    // ==================== Property Lookups ====================

    pub fn property(&self, id: &str) -> Option<&PropertyDef> {
        self.properties.get(id)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.values()
    }

    /// Get a property applicable to a class, including inherited properties.
    pub fn class_property(&self, class: &str, property: &str) -> Option<&PropertyDef> {
        let def = self.properties.get(property)?;
        self.is_subclass_of(class, def.domain.as_str())
            .then_some(def)
    }

    /// All properties applicable to a class, in id order.
    pub fn class_properties(&self, class: &str) -> Vec<&PropertyDef> {
        let mut props: Vec<&PropertyDef> = self
            .hierarchy
            .lineage(class)
            .iter()
            .filter_map(|c| self.classes.get(c))
            .flat_map(|c| c.properties.iter())
            .filter_map(|p| self.properties.get(p))
            .collect();
        props.sort_by(|a, b| a.id.cmp(&b.id));
        props
    }

    // ==================== Path Resolution ====================

    /// Resolve a dotted path whose first segment names the domain class.
    pub fn resolve_path(&self, path: &str) -> SchemaResult<PropertyPath> {
        let mut segments = path.split('.').map(str::trim);
        let domain = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SchemaError::EmptyPath(path.to_string()))?;
        let rest: Vec<&str> = segments.collect();
        self.resolve_relative(domain, &rest)
    }

    /// Resolve path segments relative to a domain class.
    pub fn resolve_relative<S: AsRef<str>>(
        &self,
        domain: &str,
        segments: &[S],
    ) -> SchemaResult<PropertyPath> {
        if !self.classes.contains_key(domain) {
            return Err(SchemaError::UnknownClass(domain.to_string()));
        }
        let Some((last, relations)) = segments.split_last() else {
            return Err(SchemaError::EmptyPath(domain.to_string()));
        };

        let mut current = domain.to_string();
        let mut steps = Vec::with_capacity(relations.len());
        for segment in relations {
            let segment = segment.as_ref();
            let def = self
                .class_property(&current, segment)
                .ok_or_else(|| SchemaError::unknown_property(&current, segment))?;
            match &def.range {
                crate::PropertyRange::Class(target) => {
                    steps.push(def.id.clone());
                    current = target.to_string();
                }
                _ => {
                    return Err(SchemaError::NotARelation {
                        class: current,
                        property: segment.to_string(),
                    })
                }
            }
        }

        let last = last.as_ref();
        let def = self
            .class_property(&current, last)
            .ok_or_else(|| SchemaError::unknown_property(&current, last))?;

        Ok(PropertyPath {
            domain: ClassId::new(domain),
            relations: steps,
            property: def.id.clone(),
        })
    }

    /// The definition of the property a path ends at.
    pub fn target_of(&self, path: &PropertyPath) -> Option<&PropertyDef> {
        self.properties.get(&path.property)
    }
}
