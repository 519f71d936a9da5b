//! Bound applicability conditions.

use shipval_core::Value;
use shipval_graph::{Entity, EntityGraph, GraphResult};
use shipval_predicate::CmpOp;
use shipval_schema::PropertyPath;
use std::cmp::Ordering;
use std::fmt;

/// An `appliesWhen` predicate whose paths and literals are bound to the schema.
///
/// Named predicates are inlined at load time. A comparison over several
/// values holds if any value satisfies it; over no value it is false.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Const(bool),
    Exists(PropertyPath),
    Compare {
        path: PropertyPath,
        op: CmpOp,
        value: Value,
    },
    In {
        path: PropertyPath,
        values: Vec<Value>,
    },
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn evaluate(&self, graph: &EntityGraph, entity: &Entity) -> GraphResult<bool> {
        match self {
            Condition::Const(b) => Ok(*b),
            Condition::Exists(path) => Ok(!graph.resolve(entity, path)?.is_empty()),
            Condition::Compare { path, op, value } => {
                let resolved = graph.resolve(entity, path)?;
                let holds = resolved.values().any(|actual| compare(actual, *op, value));
                Ok(holds)
            }
            Condition::In { path, values } => {
                let resolved = graph.resolve(entity, path)?;
                let holds = resolved
                    .values()
                    .any(|actual| values.iter().any(|v| actual.try_eq(v).unwrap_or(false)));
                Ok(holds)
            }
            Condition::Not(inner) => Ok(!inner.evaluate(graph, entity)?),
            Condition::And(l, r) => Ok(l.evaluate(graph, entity)? && r.evaluate(graph, entity)?),
            Condition::Or(l, r) => Ok(l.evaluate(graph, entity)? || r.evaluate(graph, entity)?),
        }
    }

    /// Every path the condition reads, in order of appearance.
    pub fn paths(&self) -> Vec<&PropertyPath> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a PropertyPath>) {
        match self {
            Condition::Const(_) => {}
            Condition::Exists(path) | Condition::Compare { path, .. } | Condition::In { path, .. } => {
                out.push(path)
            }
            Condition::Not(inner) => inner.collect_paths(out),
            Condition::And(l, r) | Condition::Or(l, r) => {
                l.collect_paths(out);
                r.collect_paths(out);
            }
        }
    }
}

fn compare(actual: &Value, op: CmpOp, expected: &Value) -> bool {
    match op {
        CmpOp::Eq => actual.try_eq(expected).unwrap_or(false),
        CmpOp::NotEq => actual.try_eq(expected).map(|eq| !eq).unwrap_or(false),
        _ => match actual.try_cmp(expected) {
            Ok(Ordering::Less) => matches!(op, CmpOp::Lt | CmpOp::LtEq),
            Ok(Ordering::Equal) => matches!(op, CmpOp::LtEq | CmpOp::GtEq),
            Ok(Ordering::Greater) => matches!(op, CmpOp::Gt | CmpOp::GtEq),
            Err(_) => false,
        },
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Const(b) => write!(f, "{}", b),
            Condition::Exists(path) => write!(f, "exists({})", path.relative()),
            Condition::Compare { path, op, value } => {
                write!(f, "{} {} {}", path.relative(), op.symbol(), value)
            }
            Condition::In { path, values } => {
                write!(f, "{} in [", path.relative())?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Condition::Not(inner) => write!(f, "not ({})", inner),
            Condition::And(l, r) => write!(f, "({} and {})", l, r),
            Condition::Or(l, r) => write!(f, "({} or {})", l, r),
        }
    }
}
