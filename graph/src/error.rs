//! Entity graph error types.

use thiserror::Error;

/// Structural errors in an entity graph.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("Entity {entity} declares unknown class {class}")]
    UnknownClass { entity: String, class: String },

    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    #[error("Entity not found: {0}")]
    UnknownEntity(String),

    #[error("Class {class} of entity {entity} has no property {property}")]
    UnknownProperty {
        entity: String,
        class: String,
        property: String,
    },

    #[error("Property {property} is a relationship; link entities instead")]
    ExpectedDataProperty { property: String },

    #[error("Property {property} is not a relationship")]
    ExpectedRelation { property: String },

    #[error("Single-valued property {property} already set on {entity}")]
    AlreadySet { entity: String, property: String },

    #[error("Entity {entity} populates more than one member of XOR group {group}: {members:?}")]
    XorConflict {
        entity: String,
        group: String,
        members: Vec<String>,
    },

    #[error("Entity {entity} populates no member of XOR group {group}")]
    XorUnpopulated { entity: String, group: String },

    #[error("Entity {entity} relation {relation} points to missing entity {target}")]
    DanglingReference {
        entity: String,
        relation: String,
        target: String,
    },
}

impl GraphError {
    /// Returns true for XOR exclusivity violations.
    pub fn is_xor(&self) -> bool {
        matches!(
            self,
            GraphError::XorConflict { .. } | GraphError::XorUnpopulated { .. }
        )
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
