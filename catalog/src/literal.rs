//! Binding literals to a property's range, with unit conversion.

use crate::{ConfigResult, ConfigurationError};
use shipval_core::{EntityId, Value};
use shipval_normalize::UnitTable;
use shipval_predicate::Literal;
use shipval_schema::{PropertyDef, PropertyRange, SchemaStore};
use std::fmt;

/// A literal as written in the catalog, before binding.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLiteral {
    Number(f64),
    Quantity(f64, String),
    Bool(bool),
    Text(String),
}

impl From<&Literal> for RawLiteral {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(n) => RawLiteral::Number(*n),
            Literal::Quantity(n, unit) => RawLiteral::Quantity(*n, unit.clone()),
            Literal::String(s) | Literal::Ident(s) => RawLiteral::Text(s.clone()),
            Literal::Bool(b) => RawLiteral::Bool(*b),
        }
    }
}

impl fmt::Display for RawLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLiteral::Number(n) => write!(f, "{n}"),
            RawLiteral::Quantity(n, unit) => write!(f, "{n} {unit}"),
            RawLiteral::Bool(b) => write!(f, "{b}"),
            RawLiteral::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// Convert a literal to a value comparable with `def`'s stored values.
///
/// Unitless numbers for quantities are read in the canonical unit.
pub(crate) fn bind_literal(
    schema: &SchemaStore,
    units: &UnitTable,
    def: &PropertyDef,
    literal: &RawLiteral,
    context: &str,
) -> ConfigResult<Value> {
    let mismatch = || ConfigurationError::invalid_literal(context, def.range.type_name(), literal.to_string());
    if let RawLiteral::Number(n) | RawLiteral::Quantity(n, _) = literal {
        if !n.is_finite() {
            return Err(mismatch());
        }
    }
    match (&def.range, literal) {
        (PropertyRange::Quantity(kind), RawLiteral::Number(n)) => {
            let canonical = schema.canonical_unit(kind.as_str()).ok_or_else(mismatch)?;
            Ok(Value::quantity(*n, canonical))
        }
        (PropertyRange::Quantity(kind), RawLiteral::Quantity(n, token)) => {
            let source = units
                .normalize_token(token)
                .ok_or_else(|| ConfigurationError::UnknownUnit {
                    context: context.to_string(),
                    unit: token.clone(),
                })?;
            let canonical = schema
                .canonical_unit(kind.as_str())
                .and_then(|symbol| units.get(symbol))
                .ok_or_else(mismatch)?;
            let value = units.convert(*n, source, canonical).ok_or_else(|| {
                ConfigurationError::UnitKindMismatch {
                    context: context.to_string(),
                    unit: source.symbol.clone(),
                    expected: kind.to_string(),
                    actual: source.kind.to_string(),
                }
            })?;
            Ok(Value::quantity(value, canonical.symbol.clone()))
        }
        (PropertyRange::Number, RawLiteral::Number(n)) => Ok(Value::Float(*n)),
        (PropertyRange::Number, RawLiteral::Quantity(_, token)) => {
            Err(ConfigurationError::UnitKindMismatch {
                context: context.to_string(),
                unit: token.clone(),
                expected: "dimensionless".to_string(),
                actual: units
                    .normalize_token(token)
                    .map_or_else(|| "unknown".to_string(), |u| u.kind.to_string()),
            })
        }
        (PropertyRange::Boolean, RawLiteral::Bool(b)) => Ok(Value::Bool(*b)),
        (PropertyRange::Enumeration(_), RawLiteral::Text(s)) => def
            .range
            .enum_member(s)
            .map(Value::enumeration)
            .ok_or_else(mismatch),
        (PropertyRange::Text, RawLiteral::Text(s)) => Ok(Value::Text(s.clone())),
        (PropertyRange::Class(_), RawLiteral::Text(s)) => Ok(Value::Ref(EntityId::new(s.as_str()))),
        _ => Err(mismatch()),
    }
}
