//! GraphBuilder for constructing an EntityGraph against a schema.

use crate::{Entity, EntityGraph, GraphError, GraphResult};
use shipval_core::{ClassId, EntityId, PropertyId, Value};
use shipval_schema::{PropertyDef, SchemaStore};
use std::collections::BTreeMap;

/// Builds an entity graph, checking every write against the schema.
///
/// Relationship targets are not checked here; traversal reports dangling
/// references. XOR exclusivity is checked once in [`GraphBuilder::build`].
pub struct GraphBuilder<'s> {
    schema: &'s SchemaStore,
    entities: BTreeMap<EntityId, Entity>,
}

impl<'s> GraphBuilder<'s> {
    pub fn new(schema: &'s SchemaStore) -> Self {
        Self {
            schema,
            entities: BTreeMap::new(),
        }
    }

    /// Declare an entity instance of a class.
    pub fn add_entity(&mut self, id: impl Into<EntityId>, class: &str) -> GraphResult<()> {
        let id = id.into();
        if self.schema.class(class).is_none() {
            return Err(GraphError::UnknownClass {
                entity: id.to_string(),
                class: class.to_string(),
            });
        }
        if self.entities.contains_key(&id) {
            return Err(GraphError::DuplicateEntity(id.to_string()));
        }
        let entity = Entity::new(id.clone(), ClassId::new(class));
        self.entities.insert(id, entity);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// The class of a declared entity.
    pub fn class_of(&self, id: &str) -> Option<&ClassId> {
        self.entities.get(id).map(|e| &e.class)
    }

    /// Set a data property. Multi-valued properties accumulate.
    pub fn set(&mut self, id: &str, property: &str, value: Value) -> GraphResult<()> {
        let (entity, def) = self.lookup(id, property)?;
        if def.is_object() {
            return Err(GraphError::ExpectedDataProperty {
                property: property.to_string(),
            });
        }
        let multi = def.cardinality.is_multi_valued();
        let key = def.id.clone();

        match entity.properties.get_mut(&key) {
            Some(Value::List(items)) if multi => items.push(value),
            Some(_) => {
                return Err(GraphError::AlreadySet {
                    entity: id.to_string(),
                    property: property.to_string(),
                })
            }
            None if multi => {
                entity.properties.insert(key, Value::List(vec![value]));
            }
            None => {
                entity.properties.insert(key, value);
            }
        }
        Ok(())
    }

    /// Link an entity to a target through a relationship.
    pub fn link(&mut self, id: &str, relation: &str, target: impl Into<EntityId>) -> GraphResult<()> {
        let target = target.into();
        let (entity, def) = self.lookup(id, relation)?;
        if !def.is_object() {
            return Err(GraphError::ExpectedRelation {
                property: relation.to_string(),
            });
        }
        let multi = def.cardinality.is_multi_valued();
        let targets = entity.relations.entry(def.id.clone()).or_default();
        if !multi && !targets.is_empty() && !targets.contains(&target) {
            return Err(GraphError::AlreadySet {
                entity: id.to_string(),
                property: relation.to_string(),
            });
        }
        targets.insert(target);
        Ok(())
    }

    fn lookup(&mut self, id: &str, property: &str) -> GraphResult<(&mut Entity, &'s PropertyDef)> {
        let schema = self.schema;
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownEntity(id.to_string()))?;
        let def = schema
            .class_property(entity.class.as_str(), property)
            .ok_or_else(|| GraphError::UnknownProperty {
                entity: id.to_string(),
                class: entity.class.to_string(),
                property: property.to_string(),
            })?;
        Ok((entity, def))
    }

    /// Validate XOR groups and freeze the graph.
    pub fn build(mut self) -> GraphResult<EntityGraph> {
        for entity in self.entities.values_mut() {
            for group in self.schema.xor_groups(entity.class.as_str()) {
                let populated: Vec<&PropertyId> = group
                    .members
                    .iter()
                    .filter(|m| entity.is_populated(m.as_str()))
                    .collect();
                match populated.as_slice() {
                    [member] => {
                        let member = (*member).clone();
                        entity.choose(&group.name, member);
                    }
                    [] => {
                        return Err(GraphError::XorUnpopulated {
                            entity: entity.id.to_string(),
                            group: group.name.clone(),
                        })
                    }
                    many => {
                        return Err(GraphError::XorConflict {
                            entity: entity.id.to_string(),
                            group: group.name.clone(),
                            members: many.iter().map(|m| m.to_string()).collect(),
                        })
                    }
                }
            }
        }

        tracing::debug!(entities = self.entities.len(), "entity graph built");
        Ok(EntityGraph::new(self.entities))
    }
}
