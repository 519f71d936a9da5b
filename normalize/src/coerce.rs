//! Unit Stage: coerce a raw value to the range of its resolved property.

use crate::{NormalizationError, UnitTable};
use serde::Deserialize;
use shipval_core::{EntityId, Value};
use shipval_schema::{PropertyDef, PropertyRange, SchemaStore};
use std::fmt;

/// A value as it appears in vendor JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
}

impl RawValue {
    fn kind(&self) -> &'static str {
        match self {
            RawValue::Bool(_) => "boolean",
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "text",
            RawValue::List(_) => "list",
        }
    }

    /// Finite numbers only; `NaN` and `inf` spellings are not numbers here.
    fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|n: &f64| n.is_finite())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// What a coerced record contributes to the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Values(Vec<Value>),
    Links(Vec<EntityId>),
}

pub struct UnitStage<'a> {
    schema: &'a SchemaStore,
    units: &'a UnitTable,
}

impl<'a> UnitStage<'a> {
    pub fn new(schema: &'a SchemaStore, units: &'a UnitTable) -> Self {
        Self { schema, units }
    }

    pub fn coerce(
        &self,
        label: &str,
        raw: &RawValue,
        unit: Option<&str>,
        def: &PropertyDef,
    ) -> Result<Coerced, NormalizationError> {
        let items: Vec<&RawValue> = match raw {
            RawValue::List(items) if def.cardinality.is_multi_valued() => items.iter().collect(),
            RawValue::List(_) => {
                return Err(NormalizationError::type_mismatch(
                    label,
                    def.range.type_name(),
                    "list",
                ))
            }
            single => vec![single],
        };

        if let PropertyRange::Class(_) = def.range {
            return items
                .into_iter()
                .map(|item| match item {
                    RawValue::Text(id) if !id.trim().is_empty() => Ok(EntityId::new(id.trim())),
                    other => Err(NormalizationError::type_mismatch(label, "entity id", other.kind())),
                })
                .collect::<Result<_, _>>()
                .map(Coerced::Links);
        }

        items
            .into_iter()
            .map(|item| self.coerce_scalar(label, item, unit, def))
            .collect::<Result<_, _>>()
            .map(Coerced::Values)
    }

    fn coerce_scalar(
        &self,
        label: &str,
        raw: &RawValue,
        unit: Option<&str>,
        def: &PropertyDef,
    ) -> Result<Value, NormalizationError> {
        let mismatch = || NormalizationError::type_mismatch(label, def.range.type_name(), raw.kind());
        match &def.range {
            PropertyRange::Quantity(kind) => {
                let number = raw.as_number().ok_or_else(mismatch)?;
                self.to_canonical(label, number, unit, def, kind.as_str())
            }
            PropertyRange::Number => {
                if let Some(found) = unit.and_then(|u| self.units.normalize_token(u)) {
                    return Err(NormalizationError::DimensionMismatch {
                        label: label.to_string(),
                        property: def.id.to_string(),
                        unit: found.symbol.clone(),
                        expected: "dimensionless".to_string(),
                        actual: found.kind.to_string(),
                    });
                }
                raw.as_number().map(Value::Float).ok_or_else(mismatch)
            }
            PropertyRange::Boolean => match raw {
                RawValue::Bool(b) => Ok(Value::Bool(*b)),
                RawValue::Number(n) if *n == 0.0 || *n == 1.0 => Ok(Value::Bool(*n == 1.0)),
                RawValue::Text(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
                    "false" | "no" | "n" | "0" => Ok(Value::Bool(false)),
                    _ => Err(mismatch()),
                },
                _ => Err(mismatch()),
            },
            PropertyRange::Enumeration(allowed) => {
                let text = match raw {
                    RawValue::Text(s) => s.trim().to_string(),
                    RawValue::Number(n) => n.to_string(),
                    _ => return Err(mismatch()),
                };
                def.range
                    .enum_member(&text)
                    .map(Value::enumeration)
                    .ok_or_else(|| NormalizationError::InvalidEnumValue {
                        label: label.to_string(),
                        value: text,
                        allowed: allowed.clone(),
                    })
            }
            PropertyRange::Text => match raw {
                RawValue::Text(s) => Ok(Value::Text(s.clone())),
                RawValue::Number(n) => Ok(Value::Text(n.to_string())),
                _ => Err(mismatch()),
            },
            PropertyRange::Class(_) => Err(mismatch()),
        }
    }

    fn to_canonical(
        &self,
        label: &str,
        number: f64,
        unit: Option<&str>,
        def: &PropertyDef,
        kind: &str,
    ) -> Result<Value, NormalizationError> {
        let source = match unit.map(str::trim).filter(|u| !u.is_empty()) {
            Some(token) => self
                .units
                .normalize_token(token)
                .ok_or_else(|| NormalizationError::UnknownUnit {
                    label: label.to_string(),
                    unit: token.to_string(),
                })?,
            None => self
                .units
                .infer_from_label(label, kind)
                .ok_or_else(|| NormalizationError::MissingUnit {
                    label: label.to_string(),
                    property: def.id.to_string(),
                })?,
        };
        if source.kind.as_str() != kind {
            return Err(NormalizationError::DimensionMismatch {
                label: label.to_string(),
                property: def.id.to_string(),
                unit: source.symbol.clone(),
                expected: kind.to_string(),
                actual: source.kind.to_string(),
            });
        }
        let canonical = self
            .schema
            .canonical_unit(kind)
            .and_then(|symbol| self.units.get(symbol))
            .ok_or_else(|| NormalizationError::UnknownUnit {
                label: label.to_string(),
                unit: kind.to_string(),
            })?;
        let value = self
            .units
            .convert(number, source, canonical)
            .ok_or_else(|| NormalizationError::DimensionMismatch {
                label: label.to_string(),
                property: def.id.to_string(),
                unit: source.symbol.clone(),
                expected: kind.to_string(),
                actual: canonical.kind.to_string(),
            })?;
        Ok(Value::quantity(value, canonical.symbol.clone()))
    }
}
