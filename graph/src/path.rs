//! Results of walking a property path.

use crate::Entity;
use shipval_core::{EntityId, Value};

/// An entity reached by a path walk and the values it holds for the terminal property.
#[derive(Debug, Clone)]
pub struct Reached<'g> {
    pub entity: &'g Entity,
    pub values: Vec<Value>,
}

/// All entities reached by a path walk, in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct Resolution<'g> {
    pub reached: Vec<Reached<'g>>,
}

impl<'g> Resolution<'g> {
    /// True when at least one entity was reached and every reached entity holds a value.
    pub fn is_complete(&self) -> bool {
        !self.reached.is_empty() && self.reached.iter().all(|r| !r.values.is_empty())
    }

    /// The first reached entity lacking a value, if any.
    pub fn first_missing(&self) -> Option<&EntityId> {
        self.reached
            .iter()
            .find(|r| r.values.is_empty())
            .map(|r| &r.entity.id)
    }

    /// All values, reached entity by entity.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.reached.iter().flat_map(|r| r.values.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.values().next().is_none()
    }
}
