use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("Constraint {0} has no required value to compile")]
    MissingRequiredValue(String),

    #[error("Shape export failed: {0}")]
    Export(#[from] serde_json::Error),
}

pub type ShapeResult<T> = Result<T, ShapeError>;
