//! Findings: the per-(constraint, entity) outcome.

use serde::Serialize;
use shipval_core::{ConstraintId, EntityId, Severity, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FindingStatus {
    Pass,
    Violation,
    Warning,
    NotApplicable,
    MissingData,
}

impl FindingStatus {
    pub fn name(self) -> &'static str {
        match self {
            FindingStatus::Pass => "pass",
            FindingStatus::Violation => "violation",
            FindingStatus::Warning => "warning",
            FindingStatus::NotApplicable => "notApplicable",
            FindingStatus::MissingData => "missingData",
        }
    }

    /// The failing status for a declared severity.
    pub fn failing(severity: Severity) -> Self {
        match severity {
            Severity::Violation => FindingStatus::Violation,
            Severity::Warning | Severity::Info => FindingStatus::Warning,
        }
    }

    /// Statuses that count toward coverage.
    pub fn is_evaluated(self) -> bool {
        self != FindingStatus::NotApplicable
    }

    pub fn is_failing(self) -> bool {
        matches!(self, FindingStatus::Violation | FindingStatus::Warning)
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable evaluation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    constraint_id: ConstraintId,
    entity_id: EntityId,
    status: FindingStatus,
    actual_value: Option<Value>,
    required_value: Option<Value>,
    severity: Severity,
    regulation_clause: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<String>,
}

impl Finding {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        constraint_id: ConstraintId,
        entity_id: EntityId,
        status: FindingStatus,
        actual_value: Option<Value>,
        required_value: Option<Value>,
        severity: Severity,
        regulation_clause: String,
        message: String,
        diagnostic: Option<String>,
    ) -> Self {
        Self {
            constraint_id,
            entity_id,
            status,
            actual_value,
            required_value,
            severity,
            regulation_clause,
            message,
            diagnostic,
        }
    }

    pub fn constraint_id(&self) -> &ConstraintId {
        &self.constraint_id
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn status(&self) -> FindingStatus {
        self.status
    }

    pub fn actual_value(&self) -> Option<&Value> {
        self.actual_value.as_ref()
    }

    pub fn required_value(&self) -> Option<&Value> {
        self.required_value.as_ref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn regulation_clause(&self) -> &str {
        &self.regulation_clause
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Set when an evaluation fault was downgraded to missingData.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }
}
