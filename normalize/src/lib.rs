//! Shipval Normalization Pipeline
//!
//! Maps vendor-specific raw field records onto the canonical schema.
//!
//! Responsibilities:
//! - Label gate: drop skip-listed labels, reject out-of-domain labels
//! - Resolver Stage: exact id, synonym dictionary, then fuzzy edit-distance match
//! - Unit Stage: convert `{value, unit}` to the canonical unit of the property's kind
//! - Build the Entity Graph and a Normalization Report of every field decision
//!
//! Stages are pure; the only state is the immutable schema and tables.

mod coerce;
mod error;
mod gate;
mod pipeline;
mod report;
mod resolver;
mod similarity;
mod synonyms;
mod units;

pub use coerce::{Coerced, RawValue, UnitStage};
pub use error::{NormalizationError, TableError, TableResult};
pub use gate::{GateVerdict, LabelGate, DEFAULT_OUT_OF_DOMAIN_PATTERNS};
pub use pipeline::{
    Mode, NormalizationPipeline, Normalized, PipelineConfig, PipelineError, RawEntity, RawInput,
    RawRecord,
};
pub use report::{EntityIssue, FieldReport, NormalizationReport, NormalizationSummary, ResolutionStatus};
pub use resolver::{CandidateScore, Resolution, Resolver, ResolverConfig};
pub use similarity::{levenshtein, normalize_label, similarity};
pub use synonyms::SynonymTable;
pub use units::{UnitDef, UnitTable};
