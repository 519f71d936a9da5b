//! A generic shape validator, independent of the Constraint Evaluator.

use crate::{KeyRule, Shape, ShapeComponent};
use serde::Serialize;
use shipval_catalog::{Aggregation, LookupTable};
use shipval_core::{ConstraintId, EntityId, Value};
use shipval_graph::{Entity, EntityGraph};
use shipval_schema::SchemaStore;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Verdict of the shapes of one constraint on one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeVerdict {
    NotTargeted,
    Conforms,
    Incomplete,
    Violates,
}

pub struct ShapeValidator<'a> {
    schema: &'a SchemaStore,
    graph: &'a EntityGraph,
}

impl<'a> ShapeValidator<'a> {
    pub fn new(schema: &'a SchemaStore, graph: &'a EntityGraph) -> Self {
        Self { schema, graph }
    }

    /// Validate every shape against its target entities and combine the
    /// verdicts per (source constraint, entity).
    pub fn validate(&self, shapes: &[Shape]) -> BTreeMap<(ConstraintId, EntityId), ShapeVerdict> {
        let mut verdicts: BTreeMap<(ConstraintId, EntityId), ShapeVerdict> = BTreeMap::new();
        for shape in shapes {
            for entity in self.graph.entities_of(self.schema, &shape.target_class) {
                let verdict = self.check(shape, entity);
                verdicts
                    .entry((shape.source_constraint.clone(), entity.id.clone()))
                    .and_modify(|v| *v = (*v).max(verdict))
                    .or_insert(verdict);
            }
        }
        verdicts
    }

    /// Check one shape on one entity.
    pub fn check(&self, shape: &Shape, entity: &Entity) -> ShapeVerdict {
        if let Some(condition) = &shape.condition {
            match condition.evaluate(self.graph, entity) {
                Ok(true) => {}
                Ok(false) => return ShapeVerdict::NotTargeted,
                Err(_) => return ShapeVerdict::Incomplete,
            }
        }

        if let Some(selector) = &shape.key_selector {
            let Ok(keys) = self.graph.resolve(entity, &selector.path) else {
                return ShapeVerdict::Incomplete;
            };
            let Some(key) = keys.values().next().and_then(LookupTable::key_of) else {
                return ShapeVerdict::Incomplete;
            };
            let selected = match &selector.rule {
                KeyRule::Equals(expected) => &key == expected,
                KeyRule::NoneOf(listed) => !listed.contains(&key),
            };
            if !selected {
                return ShapeVerdict::NotTargeted;
            }
        }

        let Ok(resolution) = self.graph.resolve(entity, &shape.path) else {
            return ShapeVerdict::Incomplete;
        };
        let values: Vec<&Value> = resolution.values().collect();

        let mut verdict = ShapeVerdict::Conforms;
        for component in &shape.components {
            let outcome = match component {
                ShapeComponent::MinCount(min) => {
                    if values.len() >= *min as usize {
                        ShapeVerdict::Conforms
                    } else {
                        ShapeVerdict::Violates
                    }
                }
                _ if !resolution.is_complete() => ShapeVerdict::Incomplete,
                ShapeComponent::HasValue(required) => {
                    match values.iter().map(|v| equal(v, required)).collect::<Option<Vec<bool>>>() {
                        Some(hits) if hits.contains(&true) => ShapeVerdict::Conforms,
                        Some(_) => ShapeVerdict::Violates,
                        None => ShapeVerdict::Incomplete,
                    }
                }
                bound => {
                    let checks: Option<Vec<bool>> = values.iter().map(|v| conforms(bound, v)).collect();
                    match (checks, shape.quantifier) {
                        (None, _) => ShapeVerdict::Incomplete,
                        (Some(c), Aggregation::All) if c.iter().all(|ok| *ok) => ShapeVerdict::Conforms,
                        (Some(c), Aggregation::Any) if c.iter().any(|ok| *ok) => ShapeVerdict::Conforms,
                        (Some(_), _) => ShapeVerdict::Violates,
                    }
                }
            };
            verdict = verdict.max(outcome);
        }
        verdict
    }
}

/// `None` when the values cannot be compared.
fn conforms(component: &ShapeComponent, value: &Value) -> Option<bool> {
    let order = |bound: &Value| value.try_cmp(bound).ok();
    match component {
        ShapeComponent::MinInclusive(b) => order(b).map(|o| o != Ordering::Less),
        ShapeComponent::MinExclusive(b) => order(b).map(|o| o == Ordering::Greater),
        ShapeComponent::MaxInclusive(b) => order(b).map(|o| o != Ordering::Greater),
        ShapeComponent::MaxExclusive(b) => order(b).map(|o| o == Ordering::Less),
        ShapeComponent::Equals(b) | ShapeComponent::HasValue(b) => equal(value, b),
        ShapeComponent::MinCount(_) => Some(true),
    }
}

fn equal(value: &Value, expected: &Value) -> Option<bool> {
    value.try_eq(expected).ok()
}
