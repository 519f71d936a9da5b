//! Value types for entity properties.
//!
//! Values are the atomic data stored in entity properties after normalization.
//! Quantities always carry their unit; after the unit stage that unit is the
//! canonical unit of the property's quantity kind.

use crate::{CoreError, CoreResult, EntityId};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Relative tolerance used for floating point equality.
pub const FLOAT_TOLERANCE: f64 = 1e-9;

/// Returns true if two floats are equal within [`FLOAT_TOLERANCE`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= FLOAT_TOLERANCE * scale
}

/// Compare two floats, treating values within tolerance as equal.
pub fn approx_cmp(a: f64, b: f64) -> Ordering {
    if approx_eq(a, b) {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// A numeric value with its unit symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitValue {
    pub value: f64,
    pub unit: String,
}

impl UnitValue {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// A value that can be stored in an entity property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer (counts, dimensionless integers).
    Int(i64),
    /// 64-bit floating point (dimensionless ratios and factors).
    Float(f64),
    /// Quantity with unit.
    Quantity(UnitValue),
    /// Enumeration member in its declared spelling.
    Enum(String),
    /// Free text.
    Text(String),
    /// Reference to another entity.
    Ref(EntityId),
    /// List of values.
    List(Vec<Value>),
}

impl Value {
    /// Create a quantity value.
    pub fn quantity(value: f64, unit: impl Into<String>) -> Self {
        Value::Quantity(UnitValue::new(value, unit))
    }

    /// Create an enumeration value.
    pub fn enumeration(member: impl Into<String>) -> Self {
        Value::Enum(member.into())
    }

    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the numeric magnitude of Int, Float or Quantity values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Quantity(q) => Some(q.value),
            _ => None,
        }
    }

    /// Get as quantity if this is a Quantity value.
    pub fn as_quantity(&self) -> Option<&UnitValue> {
        match self {
            Value::Quantity(q) => Some(q),
            _ => None,
        }
    }

    /// Get the text of Enum or Text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Enum(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as entity reference if this is a Ref value.
    pub fn as_ref_id(&self) -> Option<&EntityId> {
        match self {
            Value::Ref(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Quantity(_) => "Quantity",
            Value::Enum(_) => "Enum",
            Value::Text(_) => "Text",
            Value::Ref(_) => "Ref",
            Value::List(_) => "List",
        }
    }

    /// Iterate the members of a list, or the value itself for scalars.
    pub fn members(&self) -> impl Iterator<Item = &Value> {
        let slice: &[Value] = match self {
            Value::List(items) => items,
            other => std::slice::from_ref(other),
        };
        slice.iter()
    }

    /// Order two values.
    ///
    /// Numbers compare across Int/Float. Quantities compare only when their
    /// units are identical; callers convert to canonical units first.
    /// Non-finite magnitudes never compare.
    pub fn try_cmp(&self, other: &Value) -> CoreResult<Ordering> {
        if [self.as_f64(), other.as_f64()]
            .into_iter()
            .flatten()
            .any(|n| !n.is_finite())
        {
            return Err(self.incomparable(other));
        }
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let (a, b) = (self.as_f64(), other.as_f64());
                match (a, b) {
                    (Some(a), Some(b)) => Ok(approx_cmp(a, b)),
                    _ => Err(self.incomparable(other)),
                }
            }
            (Value::Quantity(a), Value::Quantity(b)) => {
                if a.unit != b.unit {
                    return Err(CoreError::UnitMismatch {
                        left: a.unit.clone(),
                        right: b.unit.clone(),
                    });
                }
                Ok(approx_cmp(a.value, b.value))
            }
            _ => Err(self.incomparable(other)),
        }
    }

    /// Equality with float tolerance and unit checks.
    pub fn try_eq(&self, other: &Value) -> CoreResult<bool> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Enum(a), Value::Enum(b)) | (Value::Text(a), Value::Text(b)) => Ok(a == b),
            (Value::Enum(a), Value::Text(b)) | (Value::Text(a), Value::Enum(b)) => Ok(a == b),
            (Value::Ref(a), Value::Ref(b)) => Ok(a == b),
            (Value::Null, Value::Null) => Ok(true),
            _ => self.try_cmp(other).map(|ord| ord == Ordering::Equal),
        }
    }

    fn incomparable(&self, other: &Value) -> CoreError {
        CoreError::Incomparable {
            left: self.type_name().to_string(),
            right: other.type_name().to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Quantity(q) => write!(f, "{}", q),
            Value::Enum(s) => write!(f, "{}", s),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Ref(id) => write!(f, "#{}", id),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<UnitValue> for Value {
    fn from(q: UnitValue) -> Self {
        Value::Quantity(q)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::Ref(id)
    }
}
