//! Report errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report export failed: {0}")]
    Export(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
