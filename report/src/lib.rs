//! Shipval Report Aggregator
//!
//! Turns the Findings of one run into a Validation Report:
//! - Coverage summaries, overall and grouped by clause and by severity
//! - A ranked list of failing and missing-data findings
//! - The run outcome, judged against a failure severity threshold
//! - JSON export

mod coverage;
mod error;
mod outcome;
mod rank;
mod report;

pub use coverage::{group_by_clause, group_by_severity, CoverageSummary};
pub use error::{ReportError, ReportResult};
pub use outcome::{judge, AbortReason, RunOutcome};
pub use rank::rank;
pub use report::ValidationReport;
