//! Normalization error types.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A per-field normalization problem.
///
/// These are recorded in the Normalization Report and only abort a run in
/// strict mode.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizationError {
    #[error("Unresolved field '{label}'")]
    Unresolved { label: String },

    #[error("Ambiguous field '{label}': {best} ({best_score:.3}) vs {second} ({second_score:.3})")]
    Ambiguous {
        label: String,
        best: String,
        best_score: f64,
        second: String,
        second_score: f64,
    },

    #[error("Out-of-domain field '{label}' (matched {pattern})")]
    OutOfDomain { label: String, pattern: String },

    #[error("Dimension mismatch for '{label}': {property} expects {expected}, unit {unit} is {actual}")]
    DimensionMismatch {
        label: String,
        property: String,
        unit: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown unit '{unit}' for field '{label}'")]
    UnknownUnit { label: String, unit: String },

    #[error("Missing unit for quantity field '{label}' ({property})")]
    MissingUnit { label: String, property: String },

    #[error("Invalid value '{value}' for '{label}': expected one of {allowed:?}")]
    InvalidEnumValue {
        label: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Value type mismatch for '{label}': expected {expected}, got {actual}")]
    ValueTypeMismatch {
        label: String,
        expected: String,
        actual: String,
    },

    #[error("Duplicate value for single-valued property {property} (field '{label}')")]
    DuplicateValue { label: String, property: String },

    #[error("Field '{label}' references unknown entity {target}")]
    UnknownReference { label: String, target: String },

    #[error("Record names undeclared entity {entity}")]
    UnknownEntity { entity: String },

    #[error("Entity {entity} declares unknown class {class}")]
    UnknownClass { entity: String, class: String },

    #[error("Entity {entity} declared twice")]
    DuplicateEntity { entity: String },
}

impl NormalizationError {
    pub fn type_mismatch(
        label: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        NormalizationError::ValueTypeMismatch {
            label: label.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl Serialize for NormalizationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Errors loading synonym and unit tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table parse error: {0}")]
    Parse(String),

    #[error("Duplicate unit symbol: {0}")]
    DuplicateUnit(String),

    #[error("Alias {alias} claimed by both {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("Unit {0} has a zero or non-finite scale")]
    InvalidScale(String),

    #[error("Canonical unit {unit} of quantity kind {kind} is not in the unit table")]
    MissingCanonicalUnit { kind: String, unit: String },

    #[error("Canonical unit {unit} is declared for {expected} but belongs to {actual}")]
    CanonicalKindMismatch {
        unit: String,
        expected: String,
        actual: String,
    },

    #[error("Canonical unit {0} must have scale 1 and offset 0")]
    NonIdentityCanonical(String),

    #[error("Synonym '{label}' maps to both {first} and {second}")]
    DuplicateSynonym {
        label: String,
        first: String,
        second: String,
    },

    #[error("Synonyms declared for unknown property {0}")]
    UnknownSynonymProperty(String),
}

/// Result type for table loading.
pub type TableResult<T> = Result<T, TableError>;
