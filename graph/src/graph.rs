//! Entity graph storage and traversal.

use crate::index::ClassIndex;
use crate::{Entity, GraphError, GraphResult, Reached, Resolution};
use shipval_core::{EntityId, Value};
use shipval_schema::{PropertyPath, SchemaStore};
use std::collections::{BTreeMap, BTreeSet};

/// The normalized instance graph of one run. Read-only once built.
#[derive(Debug, Default)]
pub struct EntityGraph {
    entities: BTreeMap<EntityId, Entity>,
    class_index: ClassIndex,
}

impl EntityGraph {
    pub(crate) fn new(entities: BTreeMap<EntityId, Entity>) -> Self {
        let mut class_index = ClassIndex::new();
        for entity in entities.values() {
            class_index.insert(entity.class.clone(), entity.id.clone());
        }
        Self {
            entities,
            class_index,
        }
    }

    // ==================== Entity Lookups ====================

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Entities of a class or any of its subclasses, in ascending id order.
    pub fn entities_of(&self, schema: &SchemaStore, class: &str) -> Vec<&Entity> {
        let ids: BTreeSet<&EntityId> = schema
            .descendants(class)
            .flat_map(|c| self.class_index.get(c.as_str()))
            .collect();
        ids.into_iter()
            .filter_map(|id| self.entities.get(id))
            .collect()
    }

    // ==================== Traversal ====================

    /// Entities related to `entity` through `relation`, in ascending id order.
    pub fn related(&self, entity: &Entity, relation: &str) -> GraphResult<Vec<&Entity>> {
        let Some(targets) = entity.relation(relation) else {
            return Ok(Vec::new());
        };
        targets
            .iter()
            .map(|target| {
                self.entities
                    .get(target)
                    .ok_or_else(|| GraphError::DanglingReference {
                        entity: entity.id.to_string(),
                        relation: relation.to_string(),
                        target: target.to_string(),
                    })
            })
            .collect()
    }

    /// Walk a path from `entity` and collect the terminal values.
    ///
    /// Relationship steps fan out to every related entity. A terminal
    /// relationship yields `Value::Ref` for each target.
    pub fn resolve<'g>(
        &'g self,
        entity: &'g Entity,
        path: &PropertyPath,
    ) -> GraphResult<Resolution<'g>> {
        let mut frontier = vec![entity];
        for relation in &path.relations {
            let mut next: BTreeMap<&EntityId, &'g Entity> = BTreeMap::new();
            for current in &frontier {
                for related in self.related(current, relation.as_str())? {
                    next.insert(&related.id, related);
                }
            }
            frontier = next.into_values().collect();
        }

        let property = path.property.as_str();
        let reached = frontier
            .into_iter()
            .map(|entity| {
                let values = match entity.relation(property) {
                    Some(targets) => targets.iter().cloned().map(Value::Ref).collect(),
                    None => entity
                        .get(property)
                        .map(|v| v.members().cloned().collect())
                        .unwrap_or_default(),
                };
                Reached { entity, values }
            })
            .collect();

        Ok(Resolution { reached })
    }
}
