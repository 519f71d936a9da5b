//! Normalization Report: one entry per raw record, plus entity-level issues.

use crate::{CandidateScore, NormalizationError};
use serde::Serialize;
use shipval_core::{PropertyId, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionStatus {
    Exact,
    Synonym,
    Fuzzy,
    Unresolved,
    Ambiguous,
    OutOfDomain,
    Skipped,
    /// Label resolved but the value was not accepted.
    Rejected,
}

impl ResolutionStatus {
    pub fn is_resolved(self) -> bool {
        matches!(
            self,
            ResolutionStatus::Exact | ResolutionStatus::Synonym | ResolutionStatus::Fuzzy
        )
    }

    /// Statuses that fail a strict-mode run.
    pub fn is_issue(self) -> bool {
        !self.is_resolved() && self != ResolutionStatus::Skipped
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub entity: String,
    pub raw_label: String,
    pub resolution_status: ResolutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_property: Option<PropertyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub needs_review: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidate_scores: Vec<CandidateScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<NormalizationError>,
}

impl FieldReport {
    pub fn new(entity: &str, raw_label: &str, status: ResolutionStatus) -> Self {
        Self {
            entity: entity.to_string(),
            raw_label: raw_label.to_string(),
            resolution_status: status,
            resolved_property: None,
            score: None,
            needs_review: false,
            candidate_scores: Vec::new(),
            normalized_value: None,
            error: None,
        }
    }

    pub fn with_error(mut self, error: NormalizationError) -> Self {
        self.error = Some(error);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityIssue {
    pub entity: String,
    pub error: NormalizationError,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationSummary {
    pub total: usize,
    pub exact: usize,
    pub synonym: usize,
    pub fuzzy: usize,
    pub needs_review: usize,
    pub unresolved: usize,
    pub ambiguous: usize,
    pub out_of_domain: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub entity_issues: usize,
    /// Resolved fields over fields that were not skipped.
    pub resolution_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationReport {
    pub fields: Vec<FieldReport>,
    pub entity_issues: Vec<EntityIssue>,
    pub summary: NormalizationSummary,
}

impl NormalizationReport {
    pub(crate) fn push(&mut self, field: FieldReport) {
        self.fields.push(field);
    }

    pub(crate) fn push_entity_issue(&mut self, entity: &str, error: NormalizationError) {
        self.entity_issues.push(EntityIssue {
            entity: entity.to_string(),
            error,
        });
    }

    pub(crate) fn finish(&mut self) {
        let mut s = NormalizationSummary {
            total: self.fields.len(),
            entity_issues: self.entity_issues.len(),
            ..Default::default()
        };
        for field in &self.fields {
            match field.resolution_status {
                ResolutionStatus::Exact => s.exact += 1,
                ResolutionStatus::Synonym => s.synonym += 1,
                ResolutionStatus::Fuzzy => s.fuzzy += 1,
                ResolutionStatus::Unresolved => s.unresolved += 1,
                ResolutionStatus::Ambiguous => s.ambiguous += 1,
                ResolutionStatus::OutOfDomain => s.out_of_domain += 1,
                ResolutionStatus::Skipped => s.skipped += 1,
                ResolutionStatus::Rejected => s.rejected += 1,
            }
            if field.needs_review {
                s.needs_review += 1;
            }
        }
        let considered = s.total - s.skipped;
        let resolved = s.exact + s.synonym + s.fuzzy;
        s.resolution_rate = if considered == 0 {
            1.0
        } else {
            resolved as f64 / considered as f64
        };
        self.summary = s;
    }

    /// The first problem in input order: entity issues, then field issues.
    pub fn first_issue(&self) -> Option<&NormalizationError> {
        self.entity_issues
            .iter()
            .map(|i| &i.error)
            .chain(self.fields.iter().filter_map(|f| f.error.as_ref()))
            .next()
    }

    pub fn has_issues(&self) -> bool {
        !self.entity_issues.is_empty()
            || self.fields.iter().any(|f| f.resolution_status.is_issue())
    }

    pub fn issue_count(&self) -> usize {
        self.entity_issues.len()
            + self
                .fields
                .iter()
                .filter(|f| f.resolution_status.is_issue())
                .count()
    }

    /// Field reports for one entity, in input order.
    pub fn for_entity<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a FieldReport> {
        self.fields.iter().filter(move |f| f.entity == entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut report = NormalizationReport::default();
        report.push(FieldReport::new("E1", "a", ResolutionStatus::Exact));
        let mut fuzzy = FieldReport::new("E1", "b", ResolutionStatus::Fuzzy);
        fuzzy.needs_review = true;
        report.push(fuzzy);
        report.push(FieldReport::new("E1", "c", ResolutionStatus::Skipped));
        report.push(
            FieldReport::new("E2", "d", ResolutionStatus::Unresolved)
                .with_error(NormalizationError::Unresolved { label: "d".into() }),
        );

        report.finish();

        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.needs_review, 1);
        assert_eq!(report.summary.skipped, 1);
        assert!((report.summary.resolution_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!(report.has_issues());
        assert_eq!(report.issue_count(), 1);
        assert_eq!(report.for_entity("E1").count(), 3);
        assert!(matches!(
            report.first_issue(),
            Some(NormalizationError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_empty_report_rate_is_one() {
        let mut report = NormalizationReport::default();
        report.finish();
        assert_eq!(report.summary.resolution_rate, 1.0);
        assert!(!report.has_issues());
    }

    #[test]
    fn test_field_serializes_camel_case() {
        let mut field = FieldReport::new("E1", "Pwr", ResolutionStatus::OutOfDomain);
        field.error = Some(NormalizationError::OutOfDomain {
            label: "Pwr".into(),
            pattern: "x".into(),
        });
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["rawLabel"], "Pwr");
        assert_eq!(json["resolutionStatus"], "outOfDomain");
        assert!(json["error"].as_str().unwrap().contains("Out-of-domain"));
        assert!(json.get("resolvedProperty").is_none());
    }
}
