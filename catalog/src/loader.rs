//! TOML loading for the Constraint Catalog.

use crate::binder::{Binder, NamedPredicates};
use crate::literal::{bind_literal, RawLiteral};
use crate::{
    Aggregation, Catalog, ConfigResult, ConfigurationError, ConstraintIntent, LookupTable,
    Operator, RequiredValue, RequirementSet, DEFAULT_MESSAGE,
};
use serde::Deserialize;
use shipval_core::{ConstraintId, RequirementSetId, Severity};
use shipval_normalize::UnitTable;
use shipval_schema::{PropertyDef, PropertyRange, SchemaStore};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    version: String,
    #[serde(default)]
    requirement_sets: Vec<RequirementSetEntry>,
    #[serde(default)]
    predicates: BTreeMap<String, String>,
    #[serde(default)]
    constraints: Vec<ConstraintEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequirementSetEntry {
    id: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstraintEntry {
    id: String,
    target: String,
    operator: String,
    #[serde(default)]
    required: Option<toml::Value>,
    #[serde(default)]
    applies_when: Option<String>,
    #[serde(default)]
    aggregation: Option<String>,
    clause: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    missing_data_severity: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    requirement_set: Option<String>,
}

impl Catalog {
    /// Parse and validate a catalog against a schema and unit table.
    pub fn from_toml(source: &str, schema: &SchemaStore, units: &UnitTable) -> ConfigResult<Self> {
        let file: CatalogFile =
            toml::from_str(source).map_err(|e| ConfigurationError::Parse(e.to_string()))?;

        let mut sets = BTreeMap::new();
        for entry in file.requirement_sets {
            let id = RequirementSetId::new(entry.id);
            if sets.contains_key(&id) {
                return Err(ConfigurationError::DuplicateRequirementSet(id.to_string()));
            }
            sets.insert(
                id.clone(),
                RequirementSet {
                    id,
                    source: entry.source,
                    version: entry.version,
                },
            );
        }

        let named = NamedPredicates::parse(&file.predicates)?;

        let mut constraints = BTreeMap::new();
        for entry in file.constraints {
            let intent = load_constraint(entry, schema, units, &named, &sets)?;
            if constraints.contains_key(&intent.id) {
                return Err(ConfigurationError::DuplicateConstraint(intent.id.to_string()));
            }
            constraints.insert(intent.id.clone(), intent);
        }

        tracing::debug!(
            version = %file.version,
            requirement_sets = sets.len(),
            predicates = named.len(),
            constraints = constraints.len(),
            "constraint catalog loaded"
        );
        Ok(Catalog::new(file.version, sets, constraints))
    }
}

fn load_constraint(
    entry: ConstraintEntry,
    schema: &SchemaStore,
    units: &UnitTable,
    named: &NamedPredicates,
    sets: &BTreeMap<RequirementSetId, RequirementSet>,
) -> ConfigResult<ConstraintIntent> {
    let context = format!("constraint {}", entry.id);
    let invalid = |field: &'static str, value: String| ConfigurationError::InvalidField {
        constraint: entry.id.clone(),
        field,
        value,
    };

    let target = schema
        .resolve_path(&entry.target)
        .map_err(|source| ConfigurationError::UnresolvedPath {
            context: context.clone(),
            path: entry.target.clone(),
            source,
        })?;
    let binder = Binder {
        schema,
        units,
        named,
        domain: target.domain.as_str(),
        context: &context,
    };
    let def = binder.target(&target)?;

    let operator: Operator = entry.operator.parse().map_err(|v| invalid("operator", v))?;
    check_operator(operator, def, &context)?;

    let required = match (operator, &entry.required) {
        (Operator::Exists, None) => RequiredValue::Present,
        (Operator::Exists, Some(value)) => {
            return Err(invalid("required", format!("{value} (exists takes no value)")))
        }
        (_, None) => {
            return Err(ConfigurationError::MissingRequiredValue {
                constraint: entry.id.clone(),
            })
        }
        (_, Some(value)) => bind_required(value, def, &binder)?,
    };

    let applies_when = entry
        .applies_when
        .as_deref()
        .map(|source| binder.bind_source(source))
        .transpose()?;

    let aggregation = match &entry.aggregation {
        Some(raw) => raw.parse::<Aggregation>().map_err(|v| invalid("aggregation", v))?,
        None => Aggregation::default(),
    };
    let severity = match &entry.severity {
        Some(raw) => raw.parse::<Severity>().map_err(|_| invalid("severity", raw.clone()))?,
        None => Severity::default(),
    };
    let missing_data_severity = match &entry.missing_data_severity {
        Some(raw) => raw
            .parse::<Severity>()
            .map_err(|_| invalid("missing_data_severity", raw.clone()))?,
        None => severity,
    };

    let requirement_set = match entry.requirement_set {
        Some(set) if !sets.contains_key(set.as_str()) => {
            return Err(ConfigurationError::UnknownRequirementSet {
                constraint: entry.id.clone(),
                set,
            })
        }
        Some(set) => Some(RequirementSetId::new(set)),
        None => None,
    };

    Ok(ConstraintIntent {
        id: ConstraintId::new(entry.id.as_str()),
        target,
        operator,
        required,
        applies_when,
        aggregation,
        clause: entry.clause,
        severity,
        missing_data_severity,
        message: entry.message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
        requirement_set,
    })
}

fn check_operator(operator: Operator, def: &PropertyDef, context: &str) -> ConfigResult<()> {
    let compatible = match operator {
        Operator::Exists => true,
        op if op.is_ordering() => def.range.is_ordered(),
        Operator::Eq => !def.range.is_object(),
        _ => true,
    };
    if compatible {
        Ok(())
    } else {
        Err(ConfigurationError::OperatorRange {
            context: context.to_string(),
            operator: operator.name().to_string(),
            range: def.range.type_name().to_string(),
        })
    }
}

fn bind_required(value: &toml::Value, def: &PropertyDef, binder: &Binder<'_>) -> ConfigResult<RequiredValue> {
    if let toml::Value::Table(table) = value {
        if let Some(key) = table.get("lookup") {
            return bind_lookup(key, table, def, binder).map(RequiredValue::Lookup);
        }
    }
    let literal = raw_literal(value, binder.context)?;
    bind_literal(binder.schema, binder.units, def, &literal, binder.context).map(RequiredValue::Fixed)
}

/// `{ lookup = "iceClass", table = { IA = 18, IAS = { value = 20, unit = "kn" } }, default = 15 }`
fn bind_lookup(
    key: &toml::Value,
    table: &toml::map::Map<String, toml::Value>,
    def: &PropertyDef,
    binder: &Binder<'_>,
) -> ConfigResult<LookupTable> {
    let context = binder.context;
    let key = key
        .as_str()
        .ok_or_else(|| ConfigurationError::invalid_literal(context, "lookup property path", key.to_string()))?;
    let segments: Vec<&str> = key.split('.').map(str::trim).collect();
    let key_path = binder.relative_path(&segments)?;
    let key_def = binder.target(&key_path)?;
    if matches!(key_def.range, PropertyRange::Quantity(_) | PropertyRange::Class(_)) {
        return Err(ConfigurationError::OperatorRange {
            context: context.to_string(),
            operator: "lookup".to_string(),
            range: key_def.range.type_name().to_string(),
        });
    }

    let rows = match table.get("table") {
        Some(toml::Value::Table(rows)) => rows,
        other => {
            return Err(ConfigurationError::invalid_literal(
                context,
                "lookup table",
                other.map_or_else(|| "nothing".to_string(), ToString::to_string),
            ))
        }
    };

    let mut entries = BTreeMap::new();
    for (raw_key, raw_value) in rows {
        let entry_key = match &key_def.range {
            PropertyRange::Enumeration(_) => key_def
                .range
                .enum_member(raw_key)
                .map(str::to_string)
                .ok_or_else(|| {
                    ConfigurationError::invalid_literal(context, "enumeration member", raw_key.clone())
                })?,
            _ => raw_key.clone(),
        };
        let literal = raw_literal(raw_value, context)?;
        let value = bind_literal(binder.schema, binder.units, def, &literal, context)?;
        entries.insert(entry_key, value);
    }

    let default = table
        .get("default")
        .map(|raw| {
            raw_literal(raw, context)
                .and_then(|lit| bind_literal(binder.schema, binder.units, def, &lit, context))
        })
        .transpose()?;

    Ok(LookupTable {
        key: key_path,
        entries,
        default,
    })
}

fn raw_literal(value: &toml::Value, context: &str) -> ConfigResult<RawLiteral> {
    match value {
        toml::Value::Integer(i) => Ok(RawLiteral::Number(*i as f64)),
        toml::Value::Float(f) => Ok(RawLiteral::Number(*f)),
        toml::Value::Boolean(b) => Ok(RawLiteral::Bool(*b)),
        toml::Value::String(s) => Ok(RawLiteral::Text(s.clone())),
        toml::Value::Table(t) => {
            let number = match t.get("value") {
                Some(toml::Value::Integer(i)) => Some(*i as f64),
                Some(toml::Value::Float(f)) => Some(*f),
                _ => None,
            };
            match (number, t.get("unit").and_then(toml::Value::as_str)) {
                (Some(n), Some(unit)) => Ok(RawLiteral::Quantity(n, unit.to_string())),
                (Some(n), None) => Ok(RawLiteral::Number(n)),
                _ => Err(ConfigurationError::invalid_literal(context, "{ value, unit }", value.to_string())),
            }
        }
        other => Err(ConfigurationError::invalid_literal(context, "literal", other.to_string())),
    }
}
