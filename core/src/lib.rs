//! Shipval Core Types
//!
//! This crate provides the foundational types used throughout the validator:
//! - Identity types (EntityId, ClassId, PropertyId, ConstraintId, ...)
//! - Value types (the Value enum, UnitValue for quantities)
//! - Severity levels shared by constraints, findings and run outcomes
//! - Common error types

mod error;
mod id;
mod severity;
mod value;

pub use error::*;
pub use id::*;
pub use severity::*;
pub use value::*;
