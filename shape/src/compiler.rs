//! Constraint Intent to Shape translation.

use crate::{KeyRule, KeySelector, Shape, ShapeComponent, ShapeError, ShapeResult};
use shipval_catalog::{ConstraintIntent, Operator, RequiredValue};
use shipval_core::Value;

fn component(operator: Operator, required: Value) -> ShapeComponent {
    match operator {
        Operator::Ge => ShapeComponent::MinInclusive(required),
        Operator::Gt => ShapeComponent::MinExclusive(required),
        Operator::Le => ShapeComponent::MaxInclusive(required),
        Operator::Lt => ShapeComponent::MaxExclusive(required),
        Operator::Eq => ShapeComponent::Equals(required),
        Operator::HasValue => ShapeComponent::HasValue(required),
        Operator::Exists => ShapeComponent::MinCount(1),
    }
}

/// Compile one intent. Lookup requirements yield one shape per row.
pub fn compile(intent: &ConstraintIntent) -> ShapeResult<Vec<Shape>> {
    let base = |id: String, components: Vec<ShapeComponent>, key_selector: Option<KeySelector>| Shape {
        id,
        source_constraint: intent.id.clone(),
        target_class: intent.target.domain.to_string(),
        path: intent.target.clone(),
        condition: intent.applies_when.clone(),
        key_selector,
        components,
        quantifier: intent.aggregation,
        severity: intent.severity,
        missing_data_severity: intent.missing_data_severity,
        clause: intent.clause.clone(),
        message: intent.message.clone(),
    };
    let shape_id = format!("{}Shape", intent.id);

    match (&intent.required, intent.operator) {
        (_, Operator::Exists) => Ok(vec![base(shape_id, vec![ShapeComponent::MinCount(1)], None)]),
        (RequiredValue::Fixed(value), op) => {
            Ok(vec![base(shape_id, vec![component(op, value.clone())], None)])
        }
        (RequiredValue::Lookup(table), op) => {
            let mut shapes: Vec<Shape> = table
                .entries
                .iter()
                .map(|(key, value)| {
                    base(
                        format!("{shape_id}#{key}"),
                        vec![component(op, value.clone())],
                        Some(KeySelector {
                            path: table.key.clone(),
                            rule: KeyRule::Equals(key.clone()),
                        }),
                    )
                })
                .collect();
            if let Some(default) = &table.default {
                shapes.push(base(
                    format!("{shape_id}#default"),
                    vec![component(op, default.clone())],
                    Some(KeySelector {
                        path: table.key.clone(),
                        rule: KeyRule::NoneOf(table.entries.keys().cloned().collect()),
                    }),
                ));
            }
            Ok(shapes)
        }
        (RequiredValue::Present, _) => Err(ShapeError::MissingRequiredValue(intent.id.to_string())),
    }
}

/// Compile intents in ascending id order.
pub fn compile_all<'c>(intents: impl IntoIterator<Item = &'c ConstraintIntent>) -> ShapeResult<Vec<Shape>> {
    let mut intents: Vec<&ConstraintIntent> = intents.into_iter().collect();
    intents.sort_by(|a, b| a.id.cmp(&b.id));
    let mut shapes = Vec::new();
    for intent in intents {
        shapes.extend(compile(intent)?);
    }
    tracing::debug!(shapes = shapes.len(), "shapes compiled");
    Ok(shapes)
}

pub fn shapes_to_json(shapes: &[Shape], pretty: bool) -> ShapeResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(shapes)?
    } else {
        serde_json::to_string(shapes)?
    };
    Ok(json)
}
