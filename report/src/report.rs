//! The Validation Report.

use crate::{group_by_clause, group_by_severity, judge, rank, AbortReason, CoverageSummary, ReportResult, RunOutcome};
use serde::Serialize;
use shipval_constraint::Finding;
use shipval_core::Severity;
use shipval_normalize::NormalizationReport;
use std::collections::BTreeMap;

/// Everything one validation run reports.
///
/// Maps are ordered, so two runs over the same inputs serialize to the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub schema_version: String,
    pub catalog_version: String,
    pub outcome: RunOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<AbortReason>,
    pub fail_on: Severity,
    pub coverage: CoverageSummary,
    pub by_clause: BTreeMap<String, CoverageSummary>,
    pub by_severity: BTreeMap<Severity, CoverageSummary>,
    pub findings: Vec<Finding>,
    pub ranked: Vec<Finding>,
    pub normalization: NormalizationReport,
}

impl ValidationReport {
    /// Aggregate the findings of a completed run.
    pub fn completed(
        findings: Vec<Finding>,
        normalization: NormalizationReport,
        fail_on: Severity,
    ) -> Self {
        let coverage = CoverageSummary::from_findings(&findings);
        let outcome = judge(&findings, fail_on);
        tracing::info!(
            findings = coverage.total,
            violated = coverage.violated,
            warned = coverage.warned,
            missing_data = coverage.missing_data,
            outcome = %outcome,
            "report aggregated"
        );
        Self {
            schema_version: String::new(),
            catalog_version: String::new(),
            outcome,
            abort_reason: None,
            fail_on,
            by_clause: group_by_clause(&findings),
            by_severity: group_by_severity(&findings),
            ranked: rank(&findings),
            coverage,
            findings,
            normalization,
        }
    }

    /// A report for a run that never produced findings.
    pub fn aborted(reason: AbortReason, normalization: NormalizationReport, fail_on: Severity) -> Self {
        tracing::warn!(reason = %reason, "run aborted");
        Self {
            schema_version: String::new(),
            catalog_version: String::new(),
            outcome: RunOutcome::Aborted,
            abort_reason: Some(reason),
            fail_on,
            coverage: CoverageSummary::from_findings(&Vec::new()),
            by_clause: BTreeMap::new(),
            by_severity: BTreeMap::new(),
            findings: Vec::new(),
            ranked: Vec::new(),
            normalization,
        }
    }

    pub fn with_versions(mut self, schema: impl Into<String>, catalog: impl Into<String>) -> Self {
        self.schema_version = schema.into();
        self.catalog_version = catalog.into();
        self
    }

    pub fn to_json(&self, pretty: bool) -> ReportResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
