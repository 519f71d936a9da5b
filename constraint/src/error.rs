//! Evaluation errors.

use shipval_core::CoreError;
use shipval_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvaluationError {
    /// A path walk hit a structurally invalid graph.
    #[error("Graph traversal failed: {0}")]
    Graph(#[from] GraphError),

    #[error("Cannot compare values: {0}")]
    Compare(#[from] CoreError),

    #[error("Lookup key {key} has no usable value ({value})")]
    LookupKey { key: String, value: String },

    #[error("Evaluation cancelled")]
    Cancelled,
}

impl EvaluationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EvaluationError::Cancelled)
    }
}

pub type EvaluationResult<T> = Result<T, EvaluationError>;
