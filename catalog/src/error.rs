//! Configuration errors raised while loading a catalog.

use shipval_predicate::ParseError;
use shipval_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Catalog parse error: {0}")]
    Parse(String),

    #[error("Duplicate constraint id: {0}")]
    DuplicateConstraint(String),

    #[error("Duplicate requirement set id: {0}")]
    DuplicateRequirementSet(String),

    #[error("Constraint {constraint} references unknown requirement set {set}")]
    UnknownRequirementSet { constraint: String, set: String },

    #[error("{context}: path '{path}' does not resolve: {source}")]
    UnresolvedPath {
        context: String,
        path: String,
        #[source]
        source: SchemaError,
    },

    #[error("{context}: invalid predicate: {error}")]
    Predicate {
        context: String,
        #[source]
        error: ParseError,
    },

    #[error("{context}: unknown named predicate @{name}")]
    UnknownPredicate { context: String, name: String },

    #[error("Named predicates form a cycle: {}", .0.join(", "))]
    PredicateCycle(Vec<String>),

    #[error("{context}: operator {operator} cannot apply to {range} property")]
    OperatorRange {
        context: String,
        operator: String,
        range: String,
    },

    #[error("{context}: unit {unit} is {actual}, expected {expected}")]
    UnitKindMismatch {
        context: String,
        unit: String,
        expected: String,
        actual: String,
    },

    #[error("{context}: unknown unit {unit}")]
    UnknownUnit { context: String, unit: String },

    #[error("{context}: expected {expected}, found {found}")]
    InvalidLiteral {
        context: String,
        expected: String,
        found: String,
    },

    #[error("Constraint {constraint} has no required value")]
    MissingRequiredValue { constraint: String },

    #[error("Constraint {constraint}: invalid {field} '{value}'")]
    InvalidField {
        constraint: String,
        field: &'static str,
        value: String,
    },

    #[error("Unknown {kind} selected: {id}")]
    UnknownSelection { kind: &'static str, id: String },
}

impl ConfigurationError {
    pub fn invalid_literal(
        context: &str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        ConfigurationError::InvalidLiteral {
            context: context.to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
