//! Run outcome judgement.

use serde::Serialize;
use shipval_constraint::{Finding, FindingStatus};
use shipval_core::Severity;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    /// No finding at or above the failure threshold, and none below it.
    Success,
    /// Findings below the failure threshold only.
    SuccessWithWarnings,
    /// At least one finding at or above the failure threshold.
    Failure,
    /// The run ended in NormalizationFailed or EvaluationFailed.
    Aborted,
}

impl RunOutcome {
    pub fn name(self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::SuccessWithWarnings => "success-with-warnings",
            RunOutcome::Failure => "failure",
            RunOutcome::Aborted => "aborted",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, RunOutcome::Success | RunOutcome::SuccessWithWarnings)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a run was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AbortReason {
    /// Strict mode and the Normalization Report holds issues.
    NormalizationFailed,
    /// The normalized data violates a structural invariant (XOR, dangling reference).
    InvalidGraph,
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AbortReason::NormalizationFailed => "normalizationFailed",
            AbortReason::InvalidGraph => "invalidGraph",
            AbortReason::Cancelled => "cancelled",
        })
    }
}

/// Judge a completed run. Violation, warning and missingData findings count
/// at their own severity; pass and notApplicable never count.
pub fn judge(findings: &[Finding], fail_on: Severity) -> RunOutcome {
    let counted = findings.iter().filter(|f| {
        matches!(
            f.status(),
            FindingStatus::Violation | FindingStatus::Warning | FindingStatus::MissingData
        )
    });
    let mut outcome = RunOutcome::Success;
    for finding in counted {
        if finding.severity() >= fail_on {
            return RunOutcome::Failure;
        }
        outcome = RunOutcome::SuccessWithWarnings;
    }
    outcome
}
