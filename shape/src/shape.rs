//! Shape records.

use serde::{Serialize, Serializer};
use shipval_catalog::{Aggregation, Condition};
use shipval_core::{ConstraintId, Severity, Value};
use shipval_schema::PropertyPath;

/// A single value constraint on the shape's path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeComponent {
    MinInclusive(Value),
    MinExclusive(Value),
    MaxInclusive(Value),
    MaxExclusive(Value),
    Equals(Value),
    HasValue(Value),
    MinCount(u32),
}

/// How a lookup row selects its entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyRule {
    Equals(String),
    /// The default row: any key not listed elsewhere.
    NoneOf(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySelector {
    #[serde(serialize_with = "path_string")]
    pub path: PropertyPath,
    pub rule: KeyRule,
}

/// A generic validation shape derived from one Constraint Intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: String,
    pub source_constraint: ConstraintId,
    pub target_class: String,
    #[serde(serialize_with = "path_string")]
    pub path: PropertyPath,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "condition_string")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_selector: Option<KeySelector>,
    pub components: Vec<ShapeComponent>,
    pub quantifier: Aggregation,
    pub severity: Severity,
    pub missing_data_severity: Severity,
    pub clause: String,
    pub message: String,
}

fn path_string<S: Serializer>(path: &PropertyPath, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(path)
}

fn condition_string<S: Serializer>(
    condition: &Option<Condition>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match condition {
        Some(c) => serializer.collect_str(c),
        None => serializer.serialize_none(),
    }
}
