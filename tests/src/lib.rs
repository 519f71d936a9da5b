//! Scenario framework for shipval integration tests.
//!
//! Scenarios run the fixture ship (or an inline input) through a full
//! validation and check findings and the run outcome.

mod error;
mod fixture;
mod scenario;

pub use error::{ScenarioError, ScenarioResult};
pub use fixture::{fixtures_dir, Fixture};
pub use scenario::{Expectation, Scenario};

/// Common imports for scenario tests.
pub mod prelude {
    pub use crate::{fixtures_dir, Expectation, Fixture, Scenario, ScenarioError, ScenarioResult};
    pub use shipval_constraint::FindingStatus;
    pub use shipval_core::{Severity, Value};
    pub use shipval_normalize::{Mode, RawInput, ResolutionStatus};
    pub use shipval_report::{AbortReason, RunOutcome, ValidationReport};
}
