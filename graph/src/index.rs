//! Indexes for graph lookups.

use shipval_core::{ClassId, EntityId};
use std::collections::{BTreeMap, BTreeSet};

/// Class index: ClassId -> Set<EntityId> (direct class only).
#[derive(Debug, Default, Clone)]
pub struct ClassIndex {
    index: BTreeMap<ClassId, BTreeSet<EntityId>>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ClassId, entity: EntityId) {
        self.index.entry(class).or_default().insert(entity);
    }

    pub fn get(&self, class: &str) -> impl Iterator<Item = &EntityId> {
        self.index.get(class).into_iter().flatten()
    }
}
