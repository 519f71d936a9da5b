//! Shipval Constraint Catalog
//!
//! Ordered collection of declarative Constraint Intents:
//! - Loaded from TOML independently of ship data
//! - Validated against the Schema Store at load time: paths, operators, literals, units
//! - `appliesWhen` predicates bound to the schema, named predicates inlined
//! - Selection by requirement set and constraint id
//!
//! Every error here is a ConfigurationError raised before any run starts.

mod binder;
mod catalog;
mod condition;
mod error;
mod literal;
mod loader;
mod model;

pub use catalog::Catalog;
pub use condition::Condition;
pub use error::{ConfigResult, ConfigurationError};
pub use literal::RawLiteral;
pub use model::{
    Aggregation, ConstraintIntent, LookupTable, Operator, RequiredValue, RequirementSet,
    DEFAULT_MESSAGE,
};
