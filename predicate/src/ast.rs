//! Abstract syntax for applicability predicates.

use std::fmt;

/// Source location of a syntax element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, column: usize) -> Self {
        Self { start, end, column }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        }
    }

    /// Returns true for operators that need ordered operands.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, CmpOp::Eq | CmpOp::NotEq)
    }
}

/// A literal operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    /// A number followed by a unit: `18 kn`.
    Quantity(f64, String),
    String(String),
    /// A bare identifier, read as an enumeration member.
    Ident(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Quantity(n, unit) => write!(f, "{} {}", n, unit),
            Literal::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Literal::Ident(s) => write!(f, "{}", s),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A dotted property path relative to the constrained entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    pub segments: Vec<String>,
    pub span: Span,
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Bool(bool, Span),
    Named(String, Span),
    Exists(PathExpr),
    Compare {
        path: PathExpr,
        op: CmpOp,
        value: Literal,
        span: Span,
    },
    In {
        path: PathExpr,
        values: Vec<Literal>,
        span: Span,
    },
    Not(Box<Expr>, Span),
    And(Box<Expr>, Box<Expr>, Span),
    Or(Box<Expr>, Box<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Bool(_, span)
            | Expr::Named(_, span)
            | Expr::Compare { span, .. }
            | Expr::In { span, .. }
            | Expr::Not(_, span)
            | Expr::And(_, _, span)
            | Expr::Or(_, _, span) => *span,
            Expr::Exists(path) => path.span,
        }
    }

    /// Names of all `@name` references, in order of appearance.
    pub fn named_refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Named(name, _) => out.push(name),
            Expr::Not(inner, _) => inner.collect_refs(out),
            Expr::And(l, r, _) | Expr::Or(l, r, _) => {
                l.collect_refs(out);
                r.collect_refs(out);
            }
            Expr::Bool(..) | Expr::Exists(_) | Expr::Compare { .. } | Expr::In { .. } => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bool(b, _) => write!(f, "{}", b),
            Expr::Named(name, _) => write!(f, "@{}", name),
            Expr::Exists(path) => write!(f, "exists({})", path),
            Expr::Compare { path, op, value, .. } => {
                write!(f, "{} {} {}", path, op.symbol(), value)
            }
            Expr::In { path, values, .. } => {
                write!(f, "{} in [", path)?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Expr::Not(inner, _) => write!(f, "not ({})", inner),
            Expr::And(l, r, _) => write!(f, "({} and {})", l, r),
            Expr::Or(l, r, _) => write!(f, "({} or {})", l, r),
        }
    }
}
