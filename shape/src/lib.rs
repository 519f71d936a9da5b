//! Shipval Shape Compiler
//!
//! Derives generic validation shapes from Constraint Intents for exchange
//! with external validators, plus an independent shape validator used to
//! check that shapes and direct evaluation agree.
//!
//! Operator mapping:
//!
//! | operator   | component       |
//! |------------|-----------------|
//! | `ge`       | `minInclusive`  |
//! | `gt`       | `minExclusive`  |
//! | `le`       | `maxInclusive`  |
//! | `lt`       | `maxExclusive`  |
//! | `eq`       | `equals`        |
//! | `hasValue` | `hasValue`      |
//! | `exists`   | `minCount = 1`  |
//!
//! A lookup requirement compiles to one shape per table row, selected by
//! the key property's value, plus a default shape when the table has one.

mod compiler;
mod error;
mod shape;
mod validator;

pub use compiler::{compile, compile_all, shapes_to_json};
pub use error::{ShapeError, ShapeResult};
pub use shape::{KeyRule, KeySelector, Shape, ShapeComponent};
pub use validator::{ShapeValidator, ShapeVerdict};
