//! Entity structure.

use shipval_core::{ClassId, EntityId, PropertyId, Value};
use std::collections::{BTreeMap, BTreeSet};

/// What one property of an entity holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Value(Value),
    Targets(BTreeSet<EntityId>),
}

/// The single populated member of an XOR group.
///
/// Group members are stored only here, so an entity cannot hold two.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub member: PropertyId,
    pub slot: Slot,
}

/// An entity in the graph.
///
/// Data properties live in a generic property map keyed by canonical id.
/// Multi-valued properties hold a `Value::List`. Relationships are sets of
/// entity ids. Once built, each XOR group of the class is one [`Alternative`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub class: ClassId,
    pub(crate) properties: BTreeMap<PropertyId, Value>,
    pub(crate) relations: BTreeMap<PropertyId, BTreeSet<EntityId>>,
    pub(crate) alternatives: BTreeMap<String, Alternative>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, class: ClassId) -> Self {
        Self {
            id,
            class,
            properties: BTreeMap::new(),
            relations: BTreeMap::new(),
            alternatives: BTreeMap::new(),
        }
    }

    /// Move `member` out of the plain maps into the group's alternative.
    pub(crate) fn choose(&mut self, group: &str, member: PropertyId) {
        let slot = match self.properties.remove(&member) {
            Some(value) => Slot::Value(value),
            None => Slot::Targets(self.relations.remove(&member).unwrap_or_default()),
        };
        self.alternatives
            .insert(group.to_string(), Alternative { member, slot });
    }

    fn chosen(&self, property: &str) -> Option<&Slot> {
        self.alternatives
            .values()
            .find(|alt| alt.member.as_str() == property)
            .map(|alt| &alt.slot)
    }

    /// Get a data property value.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property).or_else(|| match self.chosen(property) {
            Some(Slot::Value(value)) => Some(value),
            _ => None,
        })
    }

    /// Get the targets of a relationship.
    pub fn relation(&self, property: &str) -> Option<&BTreeSet<EntityId>> {
        self.relations.get(property).or_else(|| match self.chosen(property) {
            Some(Slot::Targets(targets)) => Some(targets),
            _ => None,
        })
    }

    /// Returns true if the property holds a value or at least one relationship target.
    pub fn is_populated(&self, property: &str) -> bool {
        self.get(property).is_some() || self.relation(property).is_some_and(|r| !r.is_empty())
    }

    /// The member chosen for an XOR group.
    pub fn alternative(&self, group: &str) -> Option<&Alternative> {
        self.alternatives.get(group)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&PropertyId, &Value)> {
        let chosen = self.alternatives.values().filter_map(|alt| match &alt.slot {
            Slot::Value(value) => Some((&alt.member, value)),
            Slot::Targets(_) => None,
        });
        self.properties.iter().chain(chosen)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&PropertyId, &BTreeSet<EntityId>)> {
        let chosen = self.alternatives.values().filter_map(|alt| match &alt.slot {
            Slot::Targets(targets) => Some((&alt.member, targets)),
            Slot::Value(_) => None,
        });
        self.relations.iter().chain(chosen)
    }
}
