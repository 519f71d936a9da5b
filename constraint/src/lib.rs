//! Shipval Constraint Evaluator
//!
//! Applies enabled Constraint Intents to the Entity Graph:
//! - (constraint, entity) pairs in ascending constraint id, then entity id
//! - appliesWhen, lookup requirements, path walks through relationships
//! - all/any aggregation over multi-valued targets
//! - per-pair fault isolation: an evaluation error becomes a missingData Finding
//! - rayon batches with cooperative cancellation between batches

mod cancel;
mod error;
mod evaluator;
mod finding;
mod message;

pub use cancel::CancellationToken;
pub use error::{EvaluationError, EvaluationResult};
pub use evaluator::{Evaluator, EvaluatorConfig};
pub use finding::{Finding, FindingStatus};
pub use message::{render_message, MessageContext};
