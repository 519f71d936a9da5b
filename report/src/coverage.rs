//! Coverage counting.

use serde::Serialize;
use shipval_constraint::{Finding, FindingStatus};
use shipval_core::Severity;
use std::collections::BTreeMap;

/// Status counts over a set of findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub total: usize,
    pub passed: usize,
    pub violated: usize,
    pub warned: usize,
    pub missing_data: usize,
    pub not_applicable: usize,
    /// Evaluated pairs (pass, violation, warning, missingData) over applicable pairs.
    pub coverage: f64,
    /// Pairs with a definite verdict (pass, violation, warning) over applicable pairs.
    pub data_coverage: f64,
}

impl CoverageSummary {
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut s = CoverageSummary::default();
        for finding in findings {
            s.add(finding.status());
        }
        s.finish();
        s
    }

    fn add(&mut self, status: FindingStatus) {
        self.total += 1;
        match status {
            FindingStatus::Pass => self.passed += 1,
            FindingStatus::Violation => self.violated += 1,
            FindingStatus::Warning => self.warned += 1,
            FindingStatus::MissingData => self.missing_data += 1,
            FindingStatus::NotApplicable => self.not_applicable += 1,
        }
    }

    fn finish(&mut self) {
        let applicable = self.total - self.not_applicable;
        let decided = self.passed + self.violated + self.warned;
        self.coverage = ratio(decided + self.missing_data, applicable);
        self.data_coverage = ratio(decided, applicable);
    }

    /// Number of (constraint, entity) pairs the constraints applied to.
    pub fn applicable(&self) -> usize {
        self.total - self.not_applicable
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn group_by<K: Ord>(
    findings: &[Finding],
    key: impl Fn(&Finding) -> K,
) -> BTreeMap<K, CoverageSummary> {
    let mut groups: BTreeMap<K, CoverageSummary> = BTreeMap::new();
    for finding in findings {
        groups.entry(key(finding)).or_default().add(finding.status());
    }
    for summary in groups.values_mut() {
        summary.finish();
    }
    groups
}

pub fn group_by_clause(findings: &[Finding]) -> BTreeMap<String, CoverageSummary> {
    group_by(findings, |f| f.regulation_clause().to_string())
}

pub fn group_by_severity(findings: &[Finding]) -> BTreeMap<Severity, CoverageSummary> {
    group_by(findings, |f| f.severity())
}
