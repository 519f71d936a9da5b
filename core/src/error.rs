//! Common error types.

use thiserror::Error;

/// Errors raised by core value handling.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown severity name.
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    /// Values of incompatible types were compared.
    #[error("Cannot compare {left} with {right}")]
    Incomparable { left: String, right: String },

    /// Quantities in different units were compared.
    #[error("Unit mismatch: {left} vs {right}")]
    UnitMismatch { left: String, right: String },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
