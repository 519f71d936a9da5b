//! The Constraint Evaluator.

use crate::{
    render_message, CancellationToken, EvaluationError, EvaluationResult, Finding, FindingStatus,
    MessageContext,
};
use rayon::prelude::*;
use shipval_catalog::{Aggregation, ConstraintIntent, Operator, RequiredValue};
use shipval_core::{Severity, Value};
use shipval_graph::{Entity, EntityGraph};
use shipval_schema::SchemaStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Evaluate the pairs of a batch on the rayon pool.
    pub parallel: bool,
    /// Pairs per batch; cancellation is checked between batches.
    pub batch_size: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            batch_size: 64,
        }
    }
}

/// Evaluates Constraint Intents against one frozen Entity Graph.
pub struct Evaluator<'a> {
    schema: &'a SchemaStore,
    graph: &'a EntityGraph,
    config: EvaluatorConfig,
}

/// Outcome of one pair before it becomes a Finding.
struct Verdict {
    status: FindingStatus,
    actual: Option<Value>,
    required: Option<Value>,
    severity: Severity,
}

impl<'a> Evaluator<'a> {
    pub fn new(schema: &'a SchemaStore, graph: &'a EntityGraph) -> Self {
        Self {
            schema,
            graph,
            config: EvaluatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Every (constraint, entity) pair, constraints by ascending id and
    /// entities of the target's domain class (or a subclass) by ascending id.
    pub fn pairs<'c>(
        &self,
        constraints: &[&'c ConstraintIntent],
    ) -> Vec<(&'c ConstraintIntent, &'a Entity)> {
        let mut ordered = constraints.to_vec();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));
        ordered
            .into_iter()
            .flat_map(|intent| {
                self.graph
                    .entities_of(self.schema, intent.target.domain.as_str())
                    .into_iter()
                    .map(move |entity| (intent, entity))
            })
            .collect()
    }

    /// Evaluate every pair. Cancellation discards all partial Findings.
    pub fn evaluate(
        &self,
        constraints: &[&ConstraintIntent],
        cancel: &CancellationToken,
    ) -> EvaluationResult<Vec<Finding>> {
        let pairs = self.pairs(constraints);
        let mut findings = Vec::with_capacity(pairs.len());

        for batch in pairs.chunks(self.config.batch_size.max(1)) {
            if cancel.is_cancelled() {
                tracing::info!(evaluated = findings.len(), total = pairs.len(), "evaluation cancelled");
                return Err(EvaluationError::Cancelled);
            }
            if self.config.parallel {
                let out: Vec<Finding> = batch
                    .par_iter()
                    .map(|(intent, entity)| self.evaluate_pair(intent, entity))
                    .collect();
                findings.extend(out);
            } else {
                findings.extend(batch.iter().map(|(intent, entity)| self.evaluate_pair(intent, entity)));
            }
        }

        findings.sort_by(|a, b| {
            a.constraint_id()
                .cmp(b.constraint_id())
                .then_with(|| a.entity_id().cmp(b.entity_id()))
        });
        tracing::info!(
            constraints = constraints.len(),
            findings = findings.len(),
            "evaluation complete"
        );
        Ok(findings)
    }

    /// Evaluate one pair. Faults are isolated into a missingData Finding.
    pub fn evaluate_pair(&self, intent: &ConstraintIntent, entity: &Entity) -> Finding {
        match self.judge(intent, entity) {
            Ok(verdict) => self.finding(intent, entity, verdict, None),
            Err(error) => {
                tracing::warn!(
                    constraint = %intent.id,
                    entity = %entity.id,
                    %error,
                    "evaluation fault downgraded to missing data"
                );
                let verdict = Verdict {
                    status: FindingStatus::MissingData,
                    actual: None,
                    required: None,
                    severity: intent.missing_data_severity,
                };
                self.finding(intent, entity, verdict, Some(error.to_string()))
            }
        }
    }

    fn judge(&self, intent: &ConstraintIntent, entity: &Entity) -> EvaluationResult<Verdict> {
        let missing = || Verdict {
            status: FindingStatus::MissingData,
            actual: None,
            required: None,
            severity: intent.missing_data_severity,
        };
        let not_applicable = || Verdict {
            status: FindingStatus::NotApplicable,
            actual: None,
            required: None,
            severity: intent.severity,
        };

        if let Some(condition) = &intent.applies_when {
            if !condition.evaluate(self.graph, entity)? {
                return Ok(not_applicable());
            }
        }

        let required = match &intent.required {
            RequiredValue::Present => None,
            RequiredValue::Fixed(value) => Some(value.clone()),
            RequiredValue::Lookup(table) => {
                let keys = self.graph.resolve(entity, &table.key)?;
                let Some(key) = keys.values().next() else {
                    return Ok(missing());
                };
                match table.select(key) {
                    Some(value) => Some(value.clone()),
                    None => return Ok(not_applicable()),
                }
            }
        };

        let resolution = self.graph.resolve(entity, &intent.target)?;
        let values: Vec<&Value> = resolution.values().collect();

        let (required, operator) = match (required, intent.operator) {
            (_, Operator::Exists) => {
                let status = if values.is_empty() {
                    FindingStatus::failing(intent.severity)
                } else {
                    FindingStatus::Pass
                };
                return Ok(Verdict {
                    status,
                    actual: values.first().map(|v| (*v).clone()),
                    required: None,
                    severity: intent.severity,
                });
            }
            (Some(required), operator) => (required, operator),
            (None, _) => return Ok(missing()),
        };

        if !resolution.is_complete() {
            return Ok(Verdict {
                required: Some(required),
                ..missing()
            });
        }

        let (passed, cited) = match operator {
            Operator::HasValue => {
                let mut hit = None;
                for value in &values {
                    if value.try_eq(&required)? {
                        hit = Some(*value);
                        break;
                    }
                }
                (hit.is_some(), hit.or(values.first().copied()))
            }
            _ => {
                let mut first_pass = None;
                let mut first_fail = None;
                for value in &values {
                    if satisfies(operator, value, &required)? {
                        first_pass.get_or_insert(*value);
                        if intent.aggregation == Aggregation::Any {
                            break;
                        }
                    } else {
                        first_fail.get_or_insert(*value);
                        if intent.aggregation == Aggregation::All {
                            break;
                        }
                    }
                }
                match intent.aggregation {
                    Aggregation::All => match first_fail {
                        Some(failing) => (false, Some(failing)),
                        None => (true, values.first().copied()),
                    },
                    Aggregation::Any => match first_pass {
                        Some(passing) => (true, Some(passing)),
                        None => (false, values.first().copied()),
                    },
                }
            }
        };

        Ok(Verdict {
            status: if passed {
                FindingStatus::Pass
            } else {
                FindingStatus::failing(intent.severity)
            },
            actual: cited.cloned(),
            required: Some(required),
            severity: intent.severity,
        })
    }

    fn finding(
        &self,
        intent: &ConstraintIntent,
        entity: &Entity,
        verdict: Verdict,
        diagnostic: Option<String>,
    ) -> Finding {
        let ctx = MessageContext {
            constraint: intent.id.as_str(),
            entity: entity.id.as_str(),
            property: intent.target.property.as_str(),
            actual: verdict
                .actual
                .as_ref()
                .map_or_else(|| "missing".to_string(), ToString::to_string),
            required: verdict
                .required
                .as_ref()
                .map_or_else(|| intent.required.to_string(), ToString::to_string),
            operator: intent.operator.symbol(),
            clause: &intent.clause,
            status: verdict.status.name(),
        };
        let message = render_message(&intent.message, &ctx);
        Finding::new(
            intent.id.clone(),
            entity.id.clone(),
            verdict.status,
            verdict.actual,
            verdict.required,
            verdict.severity,
            intent.clause.clone(),
            message,
            diagnostic,
        )
    }
}

fn satisfies(operator: Operator, actual: &Value, required: &Value) -> EvaluationResult<bool> {
    match operator {
        Operator::Eq | Operator::HasValue => Ok(actual.try_eq(required)?),
        Operator::Exists => Ok(true),
        ordering => Ok(ordering.accepts(actual.try_cmp(required)?)),
    }
}
