//! Schema error types.

use thiserror::Error;

/// Errors that can occur while building, loading or querying the schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Duplicate class: {0}")]
    DuplicateClass(String),

    #[error("Duplicate property: {0}")]
    DuplicateProperty(String),

    #[error("Class {class} extends unknown class {parent}")]
    UnknownParentClass { class: String, parent: String },

    #[error("Inheritance cycle detected involving class: {0}")]
    InheritanceCycle(String),

    #[error("Property {property} uses undeclared quantity kind {kind}")]
    UnknownQuantityKind { property: String, kind: String },

    #[error("Property {property} references unknown class {class}")]
    UnknownRangeClass { property: String, class: String },

    #[error("Property {0} declares an empty enumeration")]
    EmptyEnumeration(String),

    #[error("XOR group {group} on {class} needs at least two members")]
    XorGroupTooSmall { class: String, group: String },

    #[error("XOR group {group} on {class} names unknown member {member}")]
    UnknownXorMember {
        class: String,
        group: String,
        member: String,
    },

    #[error("Invalid cardinality: {0}")]
    InvalidCardinality(String),

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Class {class} has no property {property}")]
    UnknownProperty { class: String, property: String },

    #[error("Property {property} on {class} is not a relationship")]
    NotARelation { class: String, property: String },

    #[error("Empty property path: '{0}'")]
    EmptyPath(String),

    #[error("Schema parse error: {0}")]
    Parse(String),
}

impl SchemaError {
    pub fn unknown_property(class: impl Into<String>, property: impl Into<String>) -> Self {
        SchemaError::UnknownProperty {
            class: class.into(),
            property: property.into(),
        }
    }
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
