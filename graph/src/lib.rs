//! Shipval Entity Graph
//!
//! In-memory typed instance graph for one validation run:
//! - Entities with a schema-driven property map and relationship sets
//! - XOR alternatives recorded as a single chosen member per group
//! - Class index: find entities by class, including subclasses
//! - Path traversal through relationships

mod builder;
mod entity;
mod error;
mod graph;
mod index;
mod path;

pub use builder::GraphBuilder;
pub use entity::{Alternative, Entity, Slot};
pub use error::{GraphError, GraphResult};
pub use graph::EntityGraph;
pub use path::{Reached, Resolution};
