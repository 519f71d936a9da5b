//! The Constraint Catalog.

use crate::{ConfigResult, ConfigurationError, ConstraintIntent, RequirementSet};
use shipval_core::{ConstraintId, RequirementSetId};
use std::collections::BTreeMap;

/// Immutable, versioned set of Constraint Intents in ascending id order.
#[derive(Debug)]
pub struct Catalog {
    version: String,
    requirement_sets: BTreeMap<RequirementSetId, RequirementSet>,
    constraints: BTreeMap<ConstraintId, ConstraintIntent>,
}

impl Catalog {
    pub(crate) fn new(
        version: String,
        requirement_sets: BTreeMap<RequirementSetId, RequirementSet>,
        constraints: BTreeMap<ConstraintId, ConstraintIntent>,
    ) -> Self {
        Self {
            version,
            requirement_sets,
            constraints,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn requirement_sets(&self) -> impl Iterator<Item = &RequirementSet> {
        self.requirement_sets.values()
    }

    pub fn requirement_set(&self, id: &str) -> Option<&RequirementSet> {
        self.requirement_sets.get(id)
    }

    /// All constraints in ascending id order.
    pub fn constraints(&self) -> impl Iterator<Item = &ConstraintIntent> {
        self.constraints.values()
    }

    pub fn get(&self, id: &str) -> Option<&ConstraintIntent> {
        self.constraints.get(id)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// The enabled constraints, in ascending id order.
    ///
    /// An empty `sets` enables every requirement set (and constraints with
    /// none); an empty `ids` keeps every constraint of the enabled sets.
    pub fn select<S: AsRef<str>>(
        &self,
        sets: &[S],
        ids: &[S],
    ) -> ConfigResult<Vec<&ConstraintIntent>> {
        for set in sets {
            if !self.requirement_sets.contains_key(set.as_ref()) {
                return Err(ConfigurationError::UnknownSelection {
                    kind: "requirement set",
                    id: set.as_ref().to_string(),
                });
            }
        }
        for id in ids {
            if !self.constraints.contains_key(id.as_ref()) {
                return Err(ConfigurationError::UnknownSelection {
                    kind: "constraint",
                    id: id.as_ref().to_string(),
                });
            }
        }

        let in_sets = |c: &ConstraintIntent| {
            sets.is_empty()
                || c.requirement_set
                    .as_ref()
                    .is_some_and(|rs| sets.iter().any(|s| s.as_ref() == rs.as_str()))
        };
        let in_ids = |c: &ConstraintIntent| ids.is_empty() || ids.iter().any(|i| i.as_ref() == c.id.as_str());

        Ok(self
            .constraints
            .values()
            .filter(|&c| in_sets(c) && in_ids(c))
            .collect())
    }
}
