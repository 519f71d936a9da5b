//! Schema definition types.

use crate::SchemaError;
use shipval_core::{ClassId, PropertyId, QuantityKind};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// The range of a property: what kind of value it holds.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyRange {
    /// A physical quantity stored in the kind's canonical unit.
    Quantity(QuantityKind),
    /// A dimensionless number (factor, ratio, count).
    Number,
    /// A boolean flag.
    Boolean,
    /// One of a closed set of members.
    Enumeration(Vec<String>),
    /// Free text.
    Text,
    /// A relationship to entities of a class (object property).
    Class(ClassId),
}

impl PropertyRange {
    /// Returns true for object properties (relationships).
    pub fn is_object(&self) -> bool {
        matches!(self, PropertyRange::Class(_))
    }

    /// The quantity kind, if this is a quantity range.
    pub fn quantity_kind(&self) -> Option<&QuantityKind> {
        match self {
            PropertyRange::Quantity(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns true if values of this range support ordering comparisons.
    pub fn is_ordered(&self) -> bool {
        matches!(self, PropertyRange::Quantity(_) | PropertyRange::Number)
    }

    /// Match an enumeration member case-insensitively, returning the declared spelling.
    pub fn enum_member(&self, raw: &str) -> Option<&str> {
        match self {
            PropertyRange::Enumeration(members) => members
                .iter()
                .find(|m| m.eq_ignore_ascii_case(raw.trim()))
                .map(|m| m.as_str()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyRange::Quantity(_) => "Quantity",
            PropertyRange::Number => "Number",
            PropertyRange::Boolean => "Boolean",
            PropertyRange::Enumeration(_) => "Enumeration",
            PropertyRange::Text => "Text",
            PropertyRange::Class(_) => "Class",
        }
    }
}

/// Cardinality: `min..max` where `max = None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

impl Cardinality {
    pub const OPTIONAL: Cardinality = Cardinality::new(0, Some(1));
    pub const EXACTLY_ONE: Cardinality = Cardinality::new(1, Some(1));
    pub const ANY: Cardinality = Cardinality::new(0, None);
    pub const AT_LEAST_ONE: Cardinality = Cardinality::new(1, None);

    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Returns true if more than one value may be held.
    pub fn is_multi_valued(&self) -> bool {
        self.max.map_or(true, |max| max > 1)
    }

    /// Returns true if at least one value is required.
    pub fn is_required(&self) -> bool {
        self.min > 0
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::OPTIONAL
    }
}

impl FromStr for Cardinality {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidCardinality(s.to_string());
        let (min, max) = s.trim().split_once("..").ok_or_else(invalid)?;
        let min: u32 = min.trim().parse().map_err(|_| invalid())?;
        let max = match max.trim() {
            "*" => None,
            n => Some(n.parse::<u32>().map_err(|_| invalid())?),
        };
        if max.is_some_and(|max| max == 0 || max < min) {
            return Err(invalid());
        }
        Ok(Cardinality::new(min, max))
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// Property definition.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// Canonical identifier, unique across the schema.
    pub id: PropertyId,
    /// Class declaring this property (set by the class builder).
    pub domain: ClassId,
    pub range: PropertyRange,
    pub cardinality: Cardinality,
}

impl PropertyDef {
    pub fn new(id: impl Into<PropertyId>, range: PropertyRange) -> Self {
        Self {
            id: id.into(),
            domain: ClassId::new(""),
            range,
            cardinality: Cardinality::default(),
        }
    }

    pub fn quantity(id: impl Into<PropertyId>, kind: impl Into<QuantityKind>) -> Self {
        Self::new(id, PropertyRange::Quantity(kind.into()))
    }

    pub fn relation(id: impl Into<PropertyId>, class: impl Into<ClassId>) -> Self {
        Self::new(id, PropertyRange::Class(class.into()))
    }

    pub fn enumeration<S: Into<String>>(
        id: impl Into<PropertyId>,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            id,
            PropertyRange::Enumeration(members.into_iter().map(Into::into).collect()),
        )
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Returns true for object properties (relationships).
    pub fn is_object(&self) -> bool {
        self.range.is_object()
    }
}

/// Mutually exclusive property alternatives on a class.
#[derive(Debug, Clone, PartialEq)]
pub struct XorGroup {
    pub name: String,
    pub members: Vec<PropertyId>,
}

impl XorGroup {
    pub fn contains(&self, property: &str) -> bool {
        self.members.iter().any(|m| m.as_str() == property)
    }
}

/// Ontology class definition.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub id: ClassId,
    pub parent: Option<ClassId>,
    /// Properties declared directly on this class.
    pub properties: Vec<PropertyId>,
    pub xor_groups: Vec<XorGroup>,
}

/// A property path validated against the schema.
///
/// `Rudder.designSpeed` has no relation steps; `ShaftingSystem.hasMember.force`
/// traverses `hasMember` before reading `force` on each related entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    pub domain: ClassId,
    pub relations: Vec<PropertyId>,
    pub property: PropertyId,
}

impl PropertyPath {
    pub fn direct(domain: impl Into<ClassId>, property: impl Into<PropertyId>) -> Self {
        Self {
            domain: domain.into(),
            relations: Vec::new(),
            property: property.into(),
        }
    }

    /// The path without its domain class prefix.
    pub fn relative(&self) -> String {
        let mut out = String::new();
        for rel in &self.relations {
            out.push_str(rel.as_str());
            out.push('.');
        }
        out.push_str(self.property.as_str());
        out
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.relative())
    }
}

/// Precomputed ancestor/descendant relationships.
#[derive(Debug, Default, Clone)]
pub struct ClassHierarchy {
    /// For each class, itself followed by its ancestors nearest first.
    ancestors: BTreeMap<ClassId, Vec<ClassId>>,
    /// For each class, itself and all transitive subclasses.
    descendants: BTreeMap<ClassId, BTreeSet<ClassId>>,
}

impl ClassHierarchy {
    /// Build from class definitions. Parents must exist and be acyclic.
    pub fn build(classes: &BTreeMap<ClassId, ClassDef>) -> Result<Self, SchemaError> {
        let mut hierarchy = Self::default();

        for id in classes.keys() {
            let mut chain = vec![id.clone()];
            let mut current = classes.get(id).and_then(|c| c.parent.clone());
            while let Some(parent) = current {
                if chain.contains(&parent) {
                    return Err(SchemaError::InheritanceCycle(id.to_string()));
                }
                let Some(parent_def) = classes.get(&parent) else {
                    return Err(SchemaError::UnknownParentClass {
                        class: id.to_string(),
                        parent: parent.to_string(),
                    });
                };
                chain.push(parent.clone());
                current = parent_def.parent.clone();
            }
            for ancestor in &chain {
                hierarchy
                    .descendants
                    .entry(ancestor.clone())
                    .or_default()
                    .insert(id.clone());
            }
            hierarchy.ancestors.insert(id.clone(), chain);
        }

        Ok(hierarchy)
    }

    /// The class followed by its ancestors.
    pub fn lineage(&self, class: &str) -> &[ClassId] {
        self.ancestors.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The class and all its subclasses, in id order.
    pub fn descendants(&self, class: &str) -> impl Iterator<Item = &ClassId> {
        self.descendants.get(class).into_iter().flatten()
    }

    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.lineage(class).iter().any(|c| c.as_str() == ancestor)
    }
}
