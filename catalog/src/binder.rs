//! Binding parsed predicates to a domain class.

use crate::literal::{bind_literal, RawLiteral};
use crate::{ConfigResult, ConfigurationError, Condition};
use shipval_normalize::UnitTable;
use shipval_predicate::{parse_predicate, Expr, PathExpr};
use shipval_schema::{PropertyDef, PropertyPath, SchemaError, SchemaStore};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Parsed named predicates, checked for unknown references and cycles.
#[derive(Debug, Default)]
pub(crate) struct NamedPredicates {
    exprs: BTreeMap<String, Expr>,
}

impl NamedPredicates {
    pub(crate) fn parse(sources: &BTreeMap<String, String>) -> ConfigResult<Self> {
        let mut exprs = BTreeMap::new();
        for (name, source) in sources {
            let expr = parse_predicate(source).map_err(|error| ConfigurationError::Predicate {
                context: format!("predicate @{name}"),
                error,
            })?;
            exprs.insert(name.clone(), expr);
        }
        let named = Self { exprs };
        named.check_references()?;
        Ok(named)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Expr> {
        self.exprs.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Kahn's algorithm over `@name` references: whatever cannot be ordered is on a cycle.
    fn check_references(&self) -> ConfigResult<()> {
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        for (name, expr) in &self.exprs {
            in_degree.entry(name.as_str()).or_insert(0);
            let refs: BTreeSet<&str> = expr.named_refs().into_iter().collect();
            for reference in refs {
                if !self.exprs.contains_key(reference) {
                    return Err(ConfigurationError::UnknownPredicate {
                        context: format!("predicate @{name}"),
                        name: reference.to_string(),
                    });
                }
                dependents.entry(reference).or_default().push(name.as_str());
                *in_degree.entry(name.as_str()).or_insert(0) += 1;
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut ordered = 0usize;
        while let Some(name) = queue.pop_front() {
            ordered += 1;
            for dependent in dependents.get(name).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if ordered < self.exprs.len() {
            let cycle = in_degree
                .into_iter()
                .filter(|(_, d)| *d > 0)
                .map(|(n, _)| n.to_string())
                .collect();
            return Err(ConfigurationError::PredicateCycle(cycle));
        }
        Ok(())
    }
}

/// Binds predicate expressions relative to one domain class.
pub(crate) struct Binder<'a> {
    pub schema: &'a SchemaStore,
    pub units: &'a UnitTable,
    pub named: &'a NamedPredicates,
    pub domain: &'a str,
    pub context: &'a str,
}

impl Binder<'_> {
    pub(crate) fn bind_source(&self, source: &str) -> ConfigResult<Condition> {
        let expr = parse_predicate(source).map_err(|error| ConfigurationError::Predicate {
            context: self.context.to_string(),
            error,
        })?;
        self.bind(&expr)
    }

    pub(crate) fn bind(&self, expr: &Expr) -> ConfigResult<Condition> {
        match expr {
            Expr::Bool(b, _) => Ok(Condition::Const(*b)),
            Expr::Named(name, _) => {
                let inner = self
                    .named
                    .get(name)
                    .ok_or_else(|| ConfigurationError::UnknownPredicate {
                        context: self.context.to_string(),
                        name: name.clone(),
                    })?;
                self.bind(inner)
            }
            Expr::Exists(path) => Ok(Condition::Exists(self.path(path)?)),
            Expr::Compare { path, op, value, .. } => {
                let path = self.path(path)?;
                let def = self.target(&path)?;
                if op.is_ordering() && !def.range.is_ordered() {
                    return Err(ConfigurationError::OperatorRange {
                        context: self.context.to_string(),
                        operator: op.symbol().to_string(),
                        range: def.range.type_name().to_string(),
                    });
                }
                let value = bind_literal(self.schema, self.units, def, &RawLiteral::from(value), self.context)?;
                Ok(Condition::Compare {
                    path,
                    op: *op,
                    value,
                })
            }
            Expr::In { path, values, .. } => {
                let path = self.path(path)?;
                let def = self.target(&path)?;
                let values = values
                    .iter()
                    .map(|v| bind_literal(self.schema, self.units, def, &RawLiteral::from(v), self.context))
                    .collect::<ConfigResult<Vec<_>>>()?;
                Ok(Condition::In { path, values })
            }
            Expr::Not(inner, _) => Ok(Condition::Not(Box::new(self.bind(inner)?))),
            Expr::And(l, r, _) => Ok(Condition::And(Box::new(self.bind(l)?), Box::new(self.bind(r)?))),
            Expr::Or(l, r, _) => Ok(Condition::Or(Box::new(self.bind(l)?), Box::new(self.bind(r)?))),
        }
    }

    pub(crate) fn path(&self, path: &PathExpr) -> ConfigResult<PropertyPath> {
        self.relative_path(&path.segments)
    }

    pub(crate) fn relative_path<S: AsRef<str>>(&self, segments: &[S]) -> ConfigResult<PropertyPath> {
        self.schema
            .resolve_relative(self.domain, segments)
            .map_err(|source| ConfigurationError::UnresolvedPath {
                context: self.context.to_string(),
                path: segments
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<_>>()
                    .join("."),
                source,
            })
    }

    pub(crate) fn target(&self, path: &PropertyPath) -> ConfigResult<&PropertyDef> {
        let def = self
            .schema
            .target_of(path)
            .ok_or_else(|| ConfigurationError::UnresolvedPath {
                context: self.context.to_string(),
                path: path.to_string(),
                source: SchemaError::unknown_property(self.domain, path.property.as_str()),
            })?;
        Ok(def)
    }
}
