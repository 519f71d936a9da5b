//! The Normalization Pipeline: raw input to Entity Graph plus report.

use crate::report::{FieldReport, NormalizationReport, ResolutionStatus};
use crate::{
    Coerced, GateVerdict, LabelGate, NormalizationError, RawValue, Resolution, Resolver,
    ResolverConfig, SynonymTable, UnitStage, UnitTable,
};
use serde::Deserialize;
use shipval_core::{PropertyId, Value};
use shipval_graph::{EntityGraph, GraphBuilder, GraphError};
use shipval_schema::SchemaStore;
use thiserror::Error;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInput {
    #[serde(default)]
    pub entities: Vec<RawEntity>,
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

impl RawInput {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    pub id: String,
    pub class: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub entity: String,
    pub label: String,
    pub value: RawValue,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Strict fails the run on any normalization issue; lenient records and continues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Strict,
    #[default]
    Lenient,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub mode: Mode,
    pub resolver: ResolverConfig,
    pub gate: LabelGate,
}

#[derive(Debug)]
pub struct Normalized {
    pub graph: EntityGraph,
    pub report: NormalizationReport,
}

/// A failed run still carries the full report.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Strict normalization failed with {count} issue(s); first: {first}")]
    Strict {
        report: NormalizationReport,
        first: NormalizationError,
        count: usize,
    },

    #[error("Invalid entity graph: {error}")]
    Structural {
        report: NormalizationReport,
        error: GraphError,
    },
}

impl PipelineError {
    pub fn report(&self) -> &NormalizationReport {
        match self {
            PipelineError::Strict { report, .. } | PipelineError::Structural { report, .. } => report,
        }
    }
}

pub struct NormalizationPipeline<'a> {
    schema: &'a SchemaStore,
    units: &'a UnitTable,
    synonyms: &'a SynonymTable,
    config: &'a PipelineConfig,
}

impl<'a> NormalizationPipeline<'a> {
    pub fn new(
        schema: &'a SchemaStore,
        units: &'a UnitTable,
        synonyms: &'a SynonymTable,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            schema,
            units,
            synonyms,
            config,
        }
    }

    /// Normalize every record in input order.
    ///
    /// The same input always yields the same graph and report.
    pub fn run(&self, input: &RawInput) -> Result<Normalized, PipelineError> {
        let mut builder = GraphBuilder::new(self.schema);
        let mut report = NormalizationReport::default();

        for raw in &input.entities {
            if let Err(err) = builder.add_entity(raw.id.as_str(), &raw.class) {
                let issue = match err {
                    GraphError::DuplicateEntity(_) => NormalizationError::DuplicateEntity {
                        entity: raw.id.clone(),
                    },
                    _ => NormalizationError::UnknownClass {
                        entity: raw.id.clone(),
                        class: raw.class.clone(),
                    },
                };
                tracing::warn!(entity = %raw.id, error = %issue, "entity rejected");
                report.push_entity_issue(&raw.id, issue);
            }
        }

        let resolver = Resolver::new(self.schema, self.synonyms, self.config.resolver);
        let stage = UnitStage::new(self.schema, self.units);
        for record in &input.records {
            let field = self.normalize_record(record, &resolver, &stage, &mut builder);
            if let Some(error) = &field.error {
                tracing::warn!(entity = %record.entity, label = %record.label, %error, "field not normalized");
            } else {
                tracing::debug!(
                    entity = %record.entity,
                    label = %record.label,
                    status = ?field.resolution_status,
                    "field normalized"
                );
            }
            report.push(field);
        }
        report.finish();

        tracing::info!(
            records = report.summary.total,
            exact = report.summary.exact,
            synonym = report.summary.synonym,
            fuzzy = report.summary.fuzzy,
            needs_review = report.summary.needs_review,
            issues = report.issue_count(),
            "normalization complete"
        );

        if self.config.mode == Mode::Strict && report.has_issues() {
            if let Some(first) = report.first_issue().cloned() {
                let count = report.issue_count();
                return Err(PipelineError::Strict {
                    report,
                    first,
                    count,
                });
            }
        }

        match builder.build() {
            Ok(graph) => Ok(Normalized { graph, report }),
            Err(error) => Err(PipelineError::Structural { report, error }),
        }
    }

    fn normalize_record(
        &self,
        record: &RawRecord,
        resolver: &Resolver<'_>,
        stage: &UnitStage<'_>,
        builder: &mut GraphBuilder<'_>,
    ) -> FieldReport {
        let entity = record.entity.as_str();
        let label = record.label.as_str();

        let Some(class) = builder.class_of(entity).cloned() else {
            return FieldReport::new(entity, label, ResolutionStatus::Rejected).with_error(
                NormalizationError::UnknownEntity {
                    entity: entity.to_string(),
                },
            );
        };

        match self.config.gate.verdict(label) {
            GateVerdict::Pass => {}
            GateVerdict::Skip => return FieldReport::new(entity, label, ResolutionStatus::Skipped),
            GateVerdict::OutOfDomain(pattern) => {
                return FieldReport::new(entity, label, ResolutionStatus::OutOfDomain).with_error(
                    NormalizationError::OutOfDomain {
                        label: label.to_string(),
                        pattern,
                    },
                )
            }
        }

        let unit_hint = record
            .unit
            .as_deref()
            .and_then(|u| self.units.normalize_token(u));
        let resolution = resolver.resolve(label, class.as_str(), unit_hint);

        let (status, property, score) = match &resolution {
            Resolution::Exact(p) => (ResolutionStatus::Exact, p.clone(), None),
            Resolution::Synonym(p) => (ResolutionStatus::Synonym, p.clone(), None),
            Resolution::Fuzzy { property, score, .. } => {
                (ResolutionStatus::Fuzzy, property.clone(), Some(*score))
            }
            Resolution::Unresolved { candidates } => {
                let mut field = FieldReport::new(entity, label, ResolutionStatus::Unresolved)
                    .with_error(NormalizationError::Unresolved {
                        label: label.to_string(),
                    });
                field.candidate_scores = candidates.clone();
                return field;
            }
            Resolution::Ambiguous { candidates } => {
                let (best, second) = (&candidates[0], &candidates[1.min(candidates.len() - 1)]);
                let mut field = FieldReport::new(entity, label, ResolutionStatus::Ambiguous)
                    .with_error(NormalizationError::Ambiguous {
                        label: label.to_string(),
                        best: best.property.to_string(),
                        best_score: best.score,
                        second: second.property.to_string(),
                        second_score: second.score,
                    });
                field.candidate_scores = candidates.clone();
                return field;
            }
        };

        let mut field = FieldReport::new(entity, label, status);
        field.resolved_property = Some(property.clone());
        field.score = score;
        field.needs_review = score.is_some_and(|s| s < resolver.config().review_threshold);
        field.candidate_scores = resolution.candidates().to_vec();

        let Some(def) = self.schema.property(property.as_str()) else {
            field.resolution_status = ResolutionStatus::Rejected;
            return field.with_error(NormalizationError::Unresolved {
                label: label.to_string(),
            });
        };

        let outcome = stage
            .coerce(label, &record.value, record.unit.as_deref(), def)
            .and_then(|coerced| self.apply(builder, entity, label, &property, coerced));
        match outcome {
            Ok(value) => {
                field.normalized_value = Some(value);
                field
            }
            Err(error) => {
                field.resolution_status = ResolutionStatus::Rejected;
                field.with_error(error)
            }
        }
    }

    /// Write coerced values into the graph; returns the value for the report.
    fn apply(
        &self,
        builder: &mut GraphBuilder<'_>,
        entity: &str,
        label: &str,
        property: &PropertyId,
        coerced: Coerced,
    ) -> Result<Value, NormalizationError> {
        let duplicate = |err: GraphError| match err {
            GraphError::AlreadySet { .. } => NormalizationError::DuplicateValue {
                label: label.to_string(),
                property: property.to_string(),
            },
            other => NormalizationError::type_mismatch(label, property.as_str(), other.to_string()),
        };
        match coerced {
            Coerced::Values(values) => {
                for value in &values {
                    builder
                        .set(entity, property.as_str(), value.clone())
                        .map_err(duplicate)?;
                }
                Ok(collapse(values))
            }
            Coerced::Links(targets) => {
                if let Some(unknown) = targets.iter().find(|t| !builder.contains(t.as_str())) {
                    return Err(NormalizationError::UnknownReference {
                        label: label.to_string(),
                        target: unknown.to_string(),
                    });
                }
                for target in &targets {
                    builder
                        .link(entity, property.as_str(), target.clone())
                        .map_err(duplicate)?;
                }
                Ok(collapse(targets.into_iter().map(Value::Ref).collect()))
            }
        }
    }
}

fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::List(values)
    }
}
