//! Shipval Session
//!
//! Runs validations against published snapshots:
//! - `ShipvalConfig`: the `shipval.toml` configuration surface
//! - `SnapshotRegistry`: versioned, immutable schema and catalog snapshots
//! - `ValidationRun`: the per-run state machine from raw input to report
//! - `loader`: reads the configured tables from disk

mod config;
mod error;
pub mod loader;
mod run;
mod snapshot;

pub use config::{
    CatalogSection, EvaluationConfig, NormalizationConfig, RunSettings, SchemaSection,
    ShipvalConfig,
};
pub use error::{ConfigError, SessionError, SessionResult};
pub use run::{EvaluationFailure, RunState, ValidationRun};
pub use snapshot::{Snapshot, SnapshotRegistry};
