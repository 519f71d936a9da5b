//! Scenario builder.

use crate::{Fixture, ScenarioError, ScenarioResult};
use shipval_constraint::FindingStatus;
use shipval_normalize::{Mode, RawInput};
use shipval_report::{RunOutcome, ValidationReport};
use shipval_session::ValidationRun;

/// One expected finding.
#[derive(Debug, Clone)]
pub struct Expectation {
    pub constraint: String,
    pub entity: String,
    pub status: FindingStatus,
}

/// A validation run over the fixture snapshot with expected results.
pub struct Scenario {
    name: String,
    input: Option<serde_json::Value>,
    strict: bool,
    requirement_sets: Vec<String>,
    expectations: Vec<Expectation>,
    outcome: Option<RunOutcome>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: None,
            strict: false,
            requirement_sets: Vec::new(),
            expectations: Vec::new(),
            outcome: None,
        }
    }

    /// Use an inline input instead of the fixture ship.
    pub fn input(mut self, input: serde_json::Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn requirement_set(mut self, id: impl Into<String>) -> Self {
        self.requirement_sets.push(id.into());
        self
    }

    pub fn expect(mut self, constraint: &str, entity: &str, status: FindingStatus) -> Self {
        self.expectations.push(Expectation {
            constraint: constraint.to_string(),
            entity: entity.to_string(),
            status,
        });
        self
    }

    pub fn outcome(mut self, outcome: RunOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Run and verify; returns the report for further checks.
    pub fn run(&self) -> ScenarioResult<ValidationReport> {
        let fixture = Fixture::load()?;
        let mut settings = fixture.settings()?;
        if self.strict {
            settings.pipeline.mode = Mode::Strict;
        }
        if !self.requirement_sets.is_empty() {
            settings.requirement_sets = self.requirement_sets.clone();
        }
        let input = match &self.input {
            Some(json) => RawInput::from_json(&json.to_string()).map_err(|e| ScenarioError::Input {
                scenario: self.name.clone(),
                message: e.to_string(),
            })?,
            None => Fixture::input()?,
        };

        let report = ValidationRun::new(fixture.snapshot, settings).execute(&input)?;
        self.verify(&report)?;
        Ok(report)
    }

    fn verify(&self, report: &ValidationReport) -> ScenarioResult<()> {
        for expected in &self.expectations {
            let finding = report
                .findings
                .iter()
                .find(|f| {
                    f.constraint_id().as_str() == expected.constraint
                        && f.entity_id().as_str() == expected.entity
                })
                .ok_or_else(|| ScenarioError::MissingFinding {
                    scenario: self.name.clone(),
                    constraint: expected.constraint.clone(),
                    entity: expected.entity.clone(),
                })?;
            if finding.status() != expected.status {
                return Err(ScenarioError::StatusMismatch {
                    scenario: self.name.clone(),
                    constraint: expected.constraint.clone(),
                    entity: expected.entity.clone(),
                    expected: expected.status,
                    actual: finding.status(),
                });
            }
        }
        if let Some(expected) = self.outcome {
            if report.outcome != expected {
                return Err(ScenarioError::OutcomeMismatch {
                    scenario: self.name.clone(),
                    expected,
                    actual: report.outcome,
                });
            }
        }
        Ok(())
    }
}
