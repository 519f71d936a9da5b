//! Constraint Intents and their parts.

use crate::Condition;
use serde::Serialize;
use shipval_core::{ConstraintId, RequirementSetId, Severity, Value};
use shipval_schema::PropertyPath;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Template used when a constraint declares no message.
pub const DEFAULT_MESSAGE: &str = "{property} = {actual}, required {operator} {required} ({clause})";

/// Comparison operator of a Constraint Intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    HasValue,
    Exists,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ge => "ge",
            Operator::Gt => "gt",
            Operator::Le => "le",
            Operator::Lt => "lt",
            Operator::HasValue => "hasValue",
            Operator::Exists => "exists",
        }
    }

    /// Human-readable form used in messages.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Lt => "<",
            Operator::HasValue => "has value",
            Operator::Exists => "present",
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, Operator::Ge | Operator::Gt | Operator::Le | Operator::Lt)
    }

    /// Whether `actual.cmp(required)` satisfies the operator.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq | Operator::HasValue => ordering == Ordering::Equal,
            Operator::Ge => ordering != Ordering::Less,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Exists => true,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "eq" | "=" | "==" => Ok(Operator::Eq),
            "ge" | ">=" => Ok(Operator::Ge),
            "gt" | ">" => Ok(Operator::Gt),
            "le" | "<=" => Ok(Operator::Le),
            "lt" | "<" => Ok(Operator::Lt),
            "hasValue" | "has_value" => Ok(Operator::HasValue),
            "exists" => Ok(Operator::Exists),
            other => Err(other.to_string()),
        }
    }
}

/// How a comparison over several resolved values is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Aggregation {
    /// Every resolved value must satisfy the comparison.
    #[default]
    All,
    /// At least one resolved value must satisfy it.
    Any,
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all-must-satisfy" => Ok(Aggregation::All),
            "any" => Ok(Aggregation::Any),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementSet {
    pub id: RequirementSetId,
    pub source: String,
    pub version: String,
}

/// A required value keyed by another property of the same entity.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    pub key: PropertyPath,
    pub entries: BTreeMap<String, Value>,
    pub default: Option<Value>,
}

impl LookupTable {
    /// The table key a resolved key value maps to.
    pub fn key_of(value: &Value) -> Option<String> {
        match value {
            Value::Enum(s) | Value::Text(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// The entry for a key value, falling back to the default.
    pub fn select(&self, key: &Value) -> Option<&Value> {
        Self::key_of(key)
            .and_then(|k| self.entries.get(&k))
            .or(self.default.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequiredValue {
    /// No operand; used by `exists`.
    Present,
    Fixed(Value),
    Lookup(LookupTable),
}

impl fmt::Display for RequiredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredValue::Present => write!(f, "present"),
            RequiredValue::Fixed(v) => write!(f, "{}", v),
            RequiredValue::Lookup(table) => write!(f, "lookup({})", table.key.relative()),
        }
    }
}

/// A declarative rule bound to the schema.
#[derive(Debug, Clone)]
pub struct ConstraintIntent {
    pub id: ConstraintId,
    pub target: PropertyPath,
    pub operator: Operator,
    pub required: RequiredValue,
    /// `None` means the constraint always applies.
    pub applies_when: Option<Condition>,
    pub aggregation: Aggregation,
    pub clause: String,
    pub severity: Severity,
    pub missing_data_severity: Severity,
    pub message: String,
    pub requirement_set: Option<RequirementSetId>,
}
