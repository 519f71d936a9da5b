//! Scenario errors.

use shipval_constraint::FindingStatus;
use shipval_report::RunOutcome;
use shipval_session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("invalid input for scenario {scenario}: {message}")]
    Input { scenario: String, message: String },

    #[error("[{scenario}] no finding for {constraint} on {entity}")]
    MissingFinding {
        scenario: String,
        constraint: String,
        entity: String,
    },

    #[error("[{scenario}] {constraint} on {entity}: expected {expected}, got {actual}")]
    StatusMismatch {
        scenario: String,
        constraint: String,
        entity: String,
        expected: FindingStatus,
        actual: FindingStatus,
    },

    #[error("[{scenario}] expected outcome {expected}, got {actual}")]
    OutcomeMismatch {
        scenario: String,
        expected: RunOutcome,
        actual: RunOutcome,
    },
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
