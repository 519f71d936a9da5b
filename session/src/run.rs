//! The per-run state machine.

use crate::{RunSettings, SessionError, SessionResult, Snapshot};
use shipval_constraint::{CancellationToken, Evaluator};
use shipval_normalize::{NormalizationPipeline, PipelineError, RawInput};
use shipval_report::{AbortReason, ValidationReport};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationFailure {
    Cancelled,
    InvalidGraph,
}

impl From<EvaluationFailure> for AbortReason {
    fn from(failure: EvaluationFailure) -> Self {
        match failure {
            EvaluationFailure::Cancelled => AbortReason::Cancelled,
            EvaluationFailure::InvalidGraph => AbortReason::InvalidGraph,
        }
    }
}

/// Initialized → Normalizing → {Normalized | NormalizationFailed} →
/// Evaluating → {Completed | EvaluationFailed}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initialized,
    Normalizing,
    Normalized,
    /// Strict mode only.
    NormalizationFailed,
    Evaluating,
    Completed,
    EvaluationFailed(EvaluationFailure),
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::NormalizationFailed | RunState::Completed | RunState::EvaluationFailed(_)
        )
    }

    fn can_advance(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Initialized, Normalizing)
                | (Normalizing, Normalized)
                | (Normalizing, NormalizationFailed)
                // the graph is assembled at the end of normalization
                | (Normalizing, EvaluationFailed(EvaluationFailure::InvalidGraph))
                | (Normalized, Evaluating)
                | (Evaluating, Completed)
                | (Evaluating, EvaluationFailed(_))
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Initialized => write!(f, "Initialized"),
            RunState::Normalizing => write!(f, "Normalizing"),
            RunState::Normalized => write!(f, "Normalized"),
            RunState::NormalizationFailed => write!(f, "NormalizationFailed"),
            RunState::Evaluating => write!(f, "Evaluating"),
            RunState::Completed => write!(f, "Completed"),
            RunState::EvaluationFailed(EvaluationFailure::Cancelled) => {
                write!(f, "EvaluationFailed(cancelled)")
            }
            RunState::EvaluationFailed(EvaluationFailure::InvalidGraph) => {
                write!(f, "EvaluationFailed(invalidGraph)")
            }
        }
    }
}

/// One validation run over one ship's raw records.
///
/// The run owns its snapshot handle, so publishing a new snapshot while it
/// executes has no effect on it.
pub struct ValidationRun {
    snapshot: Arc<Snapshot>,
    settings: RunSettings,
    state: RunState,
    cancel: CancellationToken,
}

impl ValidationRun {
    pub fn new(snapshot: Arc<Snapshot>, settings: RunSettings) -> Self {
        Self {
            snapshot,
            settings,
            state: RunState::Initialized,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// A handle that cancels this run from another thread.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn advance(&mut self, next: RunState) -> SessionResult<()> {
        if !self.state.can_advance(next) {
            return Err(SessionError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!(from = %self.state, to = %next, "run state");
        self.state = next;
        Ok(())
    }

    /// Normalize and evaluate `input`.
    ///
    /// Aborted runs still return a report (outcome `aborted`). Errors are
    /// reserved for requirement selections the catalog does not know and for
    /// executing a run twice.
    pub fn execute(&mut self, input: &RawInput) -> SessionResult<ValidationReport> {
        let snapshot = Arc::clone(&self.snapshot);
        let fail_on = self.settings.fail_on;
        let selected = snapshot
            .catalog()
            .select(&self.settings.requirement_sets, &self.settings.constraints)?;
        let versioned = |report: ValidationReport| {
            report.with_versions(snapshot.schema().version(), snapshot.catalog().version())
        };

        self.advance(RunState::Normalizing)?;
        let normalized = NormalizationPipeline::new(
            snapshot.schema(),
            snapshot.units(),
            snapshot.synonyms(),
            &self.settings.pipeline,
        )
        .run(input);
        let normalized = match normalized {
            Ok(normalized) => normalized,
            Err(PipelineError::Strict { report, .. }) => {
                self.advance(RunState::NormalizationFailed)?;
                return Ok(versioned(ValidationReport::aborted(
                    AbortReason::NormalizationFailed,
                    report,
                    fail_on,
                )));
            }
            Err(PipelineError::Structural { report, error }) => {
                tracing::warn!(%error, "entity graph rejected");
                let failure = EvaluationFailure::InvalidGraph;
                self.advance(RunState::EvaluationFailed(failure))?;
                return Ok(versioned(ValidationReport::aborted(failure.into(), report, fail_on)));
            }
        };
        self.advance(RunState::Normalized)?;

        self.advance(RunState::Evaluating)?;
        let findings = Evaluator::new(snapshot.schema(), &normalized.graph)
            .with_config(self.settings.evaluator)
            .evaluate(&selected, &self.cancel);
        match findings {
            Ok(findings) => {
                self.advance(RunState::Completed)?;
                Ok(versioned(ValidationReport::completed(
                    findings,
                    normalized.report,
                    fail_on,
                )))
            }
            Err(error) => {
                let failure = if error.is_cancelled() {
                    EvaluationFailure::Cancelled
                } else {
                    EvaluationFailure::InvalidGraph
                };
                self.advance(RunState::EvaluationFailed(failure))?;
                Ok(versioned(ValidationReport::aborted(
                    failure.into(),
                    normalized.report,
                    fail_on,
                )))
            }
        }
    }
}
