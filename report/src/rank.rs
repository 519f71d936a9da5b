//! Presentation order for findings that need attention.

use shipval_constraint::{Finding, FindingStatus};
use std::cmp::Reverse;

/// Failing and missing-data findings, most severe first, then by clause,
/// entity and constraint id.
pub fn rank(findings: &[Finding]) -> Vec<Finding> {
    let mut ranked: Vec<Finding> = findings
        .iter()
        .filter(|f| !matches!(f.status(), FindingStatus::Pass | FindingStatus::NotApplicable))
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        (Reverse(a.severity()), a.regulation_clause(), a.entity_id(), a.constraint_id()).cmp(&(
            Reverse(b.severity()),
            b.regulation_clause(),
            b.entity_id(),
            b.constraint_id(),
        ))
    });
    ranked
}
