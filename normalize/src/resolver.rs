//! Resolver Stage: raw label to canonical property.
//!
//! Stages, first hit wins:
//! 1. exact property id applicable to the record's class
//! 2. synonym dictionary, or folded match on a property id
//! 3. fuzzy edit-distance match over the class's properties and their synonyms
//!
//! A fuzzy match is accepted only when the best score clears the threshold
//! and beats the runner-up by more than the margin.

use crate::similarity::{normalize_label, similarity};
use crate::{SynonymTable, UnitDef};
use serde::{Deserialize, Serialize};
use shipval_core::PropertyId;
use shipval_schema::{PropertyDef, SchemaStore};

const MAX_CANDIDATES: usize = 3;
const SCORE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ResolverConfig {
    /// Minimum fuzzy score; the best candidate must exceed it.
    pub threshold: f64,
    /// The best candidate must lead the runner-up by more than this.
    pub margin: f64,
    /// Accepted fuzzy matches scoring below this are flagged for review.
    pub review_threshold: f64,
    /// Scale fuzzy scores by how well the record's unit fits the candidate.
    pub unit_weighting: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            margin: 0.1,
            review_threshold: 0.7,
            unit_weighting: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub property: PropertyId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Exact(PropertyId),
    Synonym(PropertyId),
    Fuzzy {
        property: PropertyId,
        score: f64,
        candidates: Vec<CandidateScore>,
    },
    Unresolved {
        candidates: Vec<CandidateScore>,
    },
    Ambiguous {
        candidates: Vec<CandidateScore>,
    },
}

impl Resolution {
    pub fn property(&self) -> Option<&PropertyId> {
        match self {
            Resolution::Exact(p) | Resolution::Synonym(p) => Some(p),
            Resolution::Fuzzy { property, .. } => Some(property),
            Resolution::Unresolved { .. } | Resolution::Ambiguous { .. } => None,
        }
    }

    pub fn candidates(&self) -> &[CandidateScore] {
        match self {
            Resolution::Fuzzy { candidates, .. }
            | Resolution::Unresolved { candidates }
            | Resolution::Ambiguous { candidates } => candidates,
            _ => &[],
        }
    }
}

pub struct Resolver<'a> {
    schema: &'a SchemaStore,
    synonyms: &'a SynonymTable,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a SchemaStore, synonyms: &'a SynonymTable, config: ResolverConfig) -> Self {
        Self {
            schema,
            synonyms,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `label` for an entity of `class`. `unit` is the record's
    /// normalized unit, if any, used only to weight fuzzy candidates.
    pub fn resolve(&self, label: &str, class: &str, unit: Option<&UnitDef>) -> Resolution {
        let trimmed = label.trim();
        if let Some(def) = self.schema.class_property(class, trimmed) {
            return Resolution::Exact(def.id.clone());
        }

        let pool = self.schema.class_properties(class);
        let folded = normalize_label(trimmed);
        if let Some(def) = pool.iter().find(|p| normalize_label(p.id.as_str()) == folded) {
            return Resolution::Synonym(def.id.clone());
        }
        if let Some(property) = self.synonyms.lookup(trimmed) {
            if self.schema.class_property(class, property.as_str()).is_some() {
                return Resolution::Synonym(property.clone());
            }
        }

        let mut candidates: Vec<CandidateScore> = pool
            .iter()
            .map(|def| CandidateScore {
                property: def.id.clone(),
                score: self.score(trimmed, def, unit),
            })
            .filter(|c| c.score > 0.0)
            .collect();
        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.property.cmp(&b.property))
        });
        candidates.truncate(MAX_CANDIDATES);

        let Some(best) = candidates.first() else {
            return Resolution::Unresolved { candidates };
        };
        let second = candidates.get(1).map_or(0.0, |c| c.score);
        if best.score <= self.config.threshold {
            return Resolution::Unresolved { candidates };
        }
        if best.score - second <= self.config.margin + SCORE_EPSILON {
            return Resolution::Ambiguous { candidates };
        }
        Resolution::Fuzzy {
            property: best.property.clone(),
            score: best.score,
            candidates,
        }
    }

    fn score(&self, label: &str, def: &PropertyDef, unit: Option<&UnitDef>) -> f64 {
        let best = std::iter::once(def.id.as_str())
            .chain(self.synonyms.synonyms_of(def.id.as_str()).iter().map(String::as_str))
            .map(|name| similarity(label, name))
            .fold(0.0, f64::max);
        if self.config.unit_weighting {
            best * unit_fit(def, unit)
        } else {
            best
        }
    }
}

/// 1.0 when the unit's kind matches the property's kind or no unit was given,
/// 0.8 for a unit on a non-quantity property, 0.5 for a kind mismatch.
fn unit_fit(def: &PropertyDef, unit: Option<&UnitDef>) -> f64 {
    match (unit, def.range.quantity_kind()) {
        (None, _) => 1.0,
        (Some(u), Some(kind)) if &u.kind == kind => 1.0,
        (Some(_), Some(_)) => 0.5,
        (Some(_), None) => 0.8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipval_schema::{PropertyDef, SchemaBuilder};

    fn schema() -> SchemaStore {
        let mut b = SchemaBuilder::new("1");
        b.quantity_kind("power", "kW").quantity_kind("speed", "kn");
        b.add_class("PrimeMover")
            .property(PropertyDef::quantity("mcrPower", "power"))
            .property(PropertyDef::quantity("ratedSpeed", "speed"))
            .done()
            .unwrap();
        b.add_class("DieselEngine").extends("PrimeMover").done().unwrap();
        b.add_class("Propeller")
            .property(PropertyDef::quantity("propellerPower", "power"))
            .done()
            .unwrap();
        b.build().unwrap()
    }

    fn synonyms() -> SynonymTable {
        let mut s = SynonymTable::new();
        s.add("mcrPower", "power").unwrap();
        s.add("mcrPower", "Pwr_Out").unwrap();
        s
    }

    // ========== TEST: deterministic stages ==========

    #[test]
    fn test_exact_match_includes_inherited() {
        let (schema, syn) = (schema(), synonyms());
        let resolver = Resolver::new(&schema, &syn, ResolverConfig::default());
        assert_eq!(
            resolver.resolve("mcrPower", "DieselEngine", None),
            Resolution::Exact("mcrPower".into())
        );
    }

    #[test]
    fn test_synonym_match() {
        let (schema, syn) = (schema(), synonyms());
        let resolver = Resolver::new(&schema, &syn, ResolverConfig::default());
        assert_eq!(
            resolver.resolve("PWR-OUT", "PrimeMover", None),
            Resolution::Synonym("mcrPower".into())
        );
        assert_eq!(
            resolver.resolve("MCR_Power", "PrimeMover", None),
            Resolution::Synonym("mcrPower".into())
        );
    }

    #[test]
    fn test_synonym_for_other_class_is_not_used() {
        // GIVEN "power" is a synonym of mcrPower, which Propeller does not have
        let (schema, syn) = (schema(), synonyms());
        let resolver = Resolver::new(&schema, &syn, ResolverConfig::default());

        // WHEN resolving for a Propeller
        let result = resolver.resolve("power", "Propeller", None);

        // THEN it is not a synonym hit
        assert!(!matches!(result, Resolution::Synonym(_)));
    }

    // ========== TEST: fuzzy stage ==========

    #[test]
    fn test_fuzzy_accepts_clear_winner() {
        let (schema, syn) = (schema(), synonyms());
        let resolver = Resolver::new(&schema, &syn, ResolverConfig::default());

        let result = resolver.resolve("Powerrrr", "PrimeMover", None);

        match result {
            Resolution::Fuzzy { property, score, candidates } => {
                assert_eq!(property.as_str(), "mcrPower");
                assert!((score - 0.625).abs() < 1e-9);
                assert_eq!(candidates[0].property.as_str(), "mcrPower");
            }
            other => panic!("expected fuzzy match, got {other:?}"),
        }
    }

    #[test]
    fn test_fuzzy_below_threshold_is_unresolved() {
        let (schema, syn) = (schema(), synonyms());
        let resolver = Resolver::new(&schema, &syn, ResolverConfig::default());
        assert!(matches!(
            resolver.resolve("Xyzzy", "PrimeMover", None),
            Resolution::Unresolved { .. }
        ));
    }

    #[test]
    fn test_fuzzy_close_runner_up_is_ambiguous() {
        // GIVEN two properties equally close to the label
        let mut b = SchemaBuilder::new("1");
        b.add_class("Hull")
            .property(PropertyDef::new("draftFwd", shipval_schema::PropertyRange::Number))
            .property(PropertyDef::new("draftAft", shipval_schema::PropertyRange::Number))
            .done()
            .unwrap();
        let schema = b.build().unwrap();
        let syn = SynonymTable::new();
        let resolver = Resolver::new(&schema, &syn, ResolverConfig::default());

        // WHEN resolving a label equidistant from both
        let result = resolver.resolve("draftXxx", "Hull", None);

        // THEN the match is ambiguous and both candidates are reported
        match result {
            Resolution::Ambiguous { candidates } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_lead_equal_to_margin_is_ambiguous() {
        // GIVEN a label scoring 0.8 against outA and 0.6 against outB
        let mut b = SchemaBuilder::new("1");
        b.add_class("Engine")
            .property(PropertyDef::new("outA", shipval_schema::PropertyRange::Number))
            .property(PropertyDef::new("outB", shipval_schema::PropertyRange::Number))
            .done()
            .unwrap();
        let schema = b.build().unwrap();
        let syn = SynonymTable::new();
        let lead = similarity("outA1", "outA") - similarity("outA1", "outB");
        let config = |margin| ResolverConfig {
            threshold: 0.5,
            margin,
            ..ResolverConfig::default()
        };

        // WHEN the margin equals the lead exactly
        let tie = Resolver::new(&schema, &syn, config(lead)).resolve("outA1", "Engine", None);

        // THEN the match is ambiguous, and a smaller margin accepts it
        assert!(matches!(tie, Resolution::Ambiguous { .. }));
        let clear = Resolver::new(&schema, &syn, config(lead - 0.01)).resolve("outA1", "Engine", None);
        assert_eq!(clear.property().map(|p| p.as_str()), Some("outA"));
    }

    #[test]
    fn test_unit_weighting_prefers_matching_kind() {
        // GIVEN a label equally close to a power and a speed property
        let mut b = SchemaBuilder::new("1");
        b.quantity_kind("power", "kW").quantity_kind("speed", "kn");
        b.add_class("Engine")
            .property(PropertyDef::quantity("outA", "power"))
            .property(PropertyDef::quantity("outB", "speed"))
            .done()
            .unwrap();
        let schema = b.build().unwrap();
        let syn = SynonymTable::new();
        let resolver = Resolver::new(&schema, &syn, ResolverConfig::default());
        let kw = UnitDef::new("kW", "power", 1.0);

        // WHEN the record carries a power unit
        let result = resolver.resolve("outX", "Engine", Some(&kw));

        // THEN the speed candidate is halved and the power property wins
        assert_eq!(result.property().map(|p| p.as_str()), Some("outA"));
    }
}
