//! Shipval Schema Store
//!
//! Immutable, versioned catalogue of ontology classes and property definitions.
//!
//! Responsibilities:
//! - Hold class/property definitions, cardinalities, enumerations and XOR groups
//! - Fix one canonical unit per quantity kind
//! - Resolve dotted property paths (`Class.relation.property`) at load time
//! - Load from TOML configuration via SchemaBuilder

mod builder;
mod error;
mod loader;
mod store;
mod types;

pub use builder::{ClassBuilder, SchemaBuilder};
pub use error::{SchemaError, SchemaResult};
pub use store::SchemaStore;
pub use types::*;
