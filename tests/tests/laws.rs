//! Law tests: properties every run must satisfy.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use shipval_catalog::{ConstraintIntent, RequiredValue};
use shipval_constraint::{CancellationToken, EvaluationError, Evaluator, EvaluatorConfig, Finding};
use shipval_graph::EntityGraph;
use shipval_normalize::{similarity, NormalizationPipeline, PipelineConfig, UnitTable};
use shipval_shape::{compile_all, ShapeValidator, ShapeVerdict};
use shipval_tests::prelude::*;
use std::collections::BTreeMap;
use std::fs;

fn fixture_graph(fixture: &Fixture) -> EntityGraph {
    let input = Fixture::input().unwrap();
    let config: PipelineConfig = fixture.settings().unwrap().pipeline;
    let snapshot = &fixture.snapshot;
    NormalizationPipeline::new(snapshot.schema(), snapshot.units(), snapshot.synonyms(), &config)
        .run(&input)
        .unwrap()
        .graph
}

fn intents(fixture: &Fixture) -> Vec<&ConstraintIntent> {
    fixture.snapshot.catalog().constraints().collect()
}

fn evaluate(fixture: &Fixture, graph: &EntityGraph, config: EvaluatorConfig) -> Vec<Finding> {
    Evaluator::new(fixture.snapshot.schema(), graph)
        .with_config(config)
        .evaluate(&intents(fixture), &CancellationToken::new())
        .unwrap()
}

// ========== TEST: idempotence ==========
#[test]
fn test_evaluation_is_idempotent() {
    // GIVEN one frozen graph and catalog
    let fixture = Fixture::load().unwrap();
    let graph = fixture_graph(&fixture);

    // WHEN evaluating twice, once in parallel batches and once sequentially
    let first = evaluate(&fixture, &graph, EvaluatorConfig::default());
    let second = evaluate(
        &fixture,
        &graph,
        EvaluatorConfig {
            parallel: false,
            batch_size: 1,
        },
    );

    // THEN the findings serialize to the same bytes
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_report_export_is_idempotent() {
    let run = || Scenario::new("idempotent").run().unwrap().to_json(true).unwrap();
    assert_eq!(run(), run());
}

// ========== TEST: coverage_law ==========
#[test]
fn test_one_finding_per_applicable_pair() {
    // GIVEN the fixture graph
    let fixture = Fixture::load().unwrap();
    let graph = fixture_graph(&fixture);
    let evaluator = Evaluator::new(fixture.snapshot.schema(), &graph);

    // WHEN evaluating every constraint
    let findings = evaluate(&fixture, &graph, EvaluatorConfig::default());

    // THEN each (constraint, entity) pair has exactly one finding
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for f in &findings {
        *counts
            .entry((f.constraint_id().to_string(), f.entity_id().to_string()))
            .or_default() += 1;
    }
    let pairs = evaluator.pairs(&intents(&fixture));
    assert_eq!(counts.len(), pairs.len());
    assert!(counts.values().all(|n| *n == 1));
    for (intent, entity) in pairs {
        let applies = intent
            .applies_when
            .as_ref()
            .map_or(true, |c| c.evaluate(&graph, entity).unwrap());
        let status = findings
            .iter()
            .find(|f| f.constraint_id() == &intent.id && f.entity_id() == &entity.id)
            .unwrap()
            .status();
        if !applies {
            assert_eq!(status, FindingStatus::NotApplicable, "{} on {}", intent.id, entity.id);
            continue;
        }
        match &intent.required {
            RequiredValue::Lookup(table) => {
                let key = graph.resolve(entity, &table.key).unwrap();
                match key.values().next() {
                    None => assert_eq!(status, FindingStatus::MissingData, "{} on {}", intent.id, entity.id),
                    Some(key) if table.select(key).is_none() => {
                        assert_eq!(status, FindingStatus::NotApplicable, "{} on {}", intent.id, entity.id)
                    }
                    Some(_) => assert!(status.is_evaluated(), "{} on {} not evaluated", intent.id, entity.id),
                };
            }
            _ => assert!(status.is_evaluated(), "{} on {} not evaluated", intent.id, entity.id),
        }
    }
}

// ========== TEST: shape_evaluator_equivalence ==========
#[test]
fn test_shapes_agree_with_evaluator() {
    // GIVEN the fixture graph and the compiled catalog
    let fixture = Fixture::load().unwrap();
    let graph = fixture_graph(&fixture);
    let shapes = compile_all(fixture.snapshot.catalog().constraints()).unwrap();

    // WHEN validating with both engines
    let verdicts = ShapeValidator::new(fixture.snapshot.schema(), &graph).validate(&shapes);
    let findings = evaluate(&fixture, &graph, EvaluatorConfig::default());

    // THEN they agree on every pair
    for finding in &findings {
        let verdict = verdicts
            .get(&(finding.constraint_id().clone(), finding.entity_id().clone()))
            .copied()
            .unwrap_or(ShapeVerdict::NotTargeted);
        let expected = match finding.status() {
            FindingStatus::Pass => ShapeVerdict::Conforms,
            FindingStatus::Violation | FindingStatus::Warning => ShapeVerdict::Violates,
            FindingStatus::MissingData => ShapeVerdict::Incomplete,
            FindingStatus::NotApplicable => ShapeVerdict::NotTargeted,
        };
        assert_eq!(
            verdict,
            expected,
            "{} on {}",
            finding.constraint_id(),
            finding.entity_id()
        );
    }
}

// ========== TEST: cancellation ==========
#[test]
fn test_cancelled_evaluation_returns_no_findings() {
    let fixture = Fixture::load().unwrap();
    let graph = fixture_graph(&fixture);
    let token = CancellationToken::new();
    token.cancel();

    let result = Evaluator::new(fixture.snapshot.schema(), &graph).evaluate(&intents(&fixture), &token);

    assert!(matches!(result, Err(EvaluationError::Cancelled)));
}

// ========== TEST: snapshot_isolation ==========
#[test]
fn test_published_snapshot_does_not_affect_held_one() {
    use shipval_session::{loader, SnapshotRegistry, ValidationRun};

    // GIVEN a registry and a run holding version 1
    let fixture = Fixture::load().unwrap();
    let (config, base) = loader::load_config(&fixtures_dir().join("shipval.toml")).unwrap();
    let registry = SnapshotRegistry::new(loader::load_snapshot(&config, &base).unwrap());
    let mut held = ValidationRun::new(registry.acquire(), fixture.settings().unwrap());

    // WHEN a catalog with a stricter rudder minimum is published
    let catalog = fs::read_to_string(fixtures_dir().join("catalog.toml"))
        .unwrap()
        .replace("IA = 18", "IA = 14")
        .replace("version = \"2024.1\"", "version = \"2024.2\"");
    let dir = fixtures_dir();
    let read = |name: &str| fs::read_to_string(dir.join(name)).unwrap();
    let next = shipval_session::Snapshot::from_sources(
        &read("schema.toml"),
        &read("units.toml"),
        &read("synonyms.toml"),
        &catalog,
    )
    .unwrap();
    assert_eq!(registry.publish(next), 2);

    // THEN the held run still reports against 2024.1, a new run against 2024.2
    let input = Fixture::input().unwrap();
    let old = held.execute(&input).unwrap();
    let new = ValidationRun::new(registry.acquire(), fixture.settings().unwrap())
        .execute(&input)
        .unwrap();
    let rudder = |r: &ValidationReport| {
        r.findings
            .iter()
            .find(|f| f.constraint_id().as_str() == "ICE-RUDDER-SPEED" && f.entity_id().as_str() == "R1")
            .unwrap()
            .status()
    };
    assert_eq!(old.catalog_version, "2024.1");
    assert_eq!(rudder(&old), FindingStatus::Violation);
    assert_eq!(new.catalog_version, "2024.2");
    assert_eq!(rudder(&new), FindingStatus::Pass);
}

// ========== TEST: unit_round_trip ==========
fn fixture_units() -> UnitTable {
    UnitTable::from_toml(&fs::read_to_string(fixtures_dir().join("units.toml")).unwrap()).unwrap()
}

proptest! {
    #[test]
    fn prop_unit_round_trip(
        value in -1.0e6f64..1.0e6,
        symbol in prop::sample::select(vec!["kW", "MW", "hp", "m/s", "rev/s", "Nm", "N", "mm", "degC", "degF"]),
    ) {
        let units = fixture_units();
        let unit = units.get(symbol).unwrap();
        let back = unit.from_canonical(unit.to_canonical(value));
        prop_assert!((back - value).abs() <= 1e-9 * value.abs().max(1.0));
    }

    #[test]
    fn prop_similarity_is_symmetric(a in "[A-Za-z_ ]{0,12}", b in "[A-Za-z_ ]{0,12}") {
        prop_assert_eq!(similarity(&a, &b), similarity(&b, &a));
    }
}

#[test]
fn test_rotational_speed_never_converts_to_knots() {
    let units = fixture_units();
    let rpm = units.get("rpm").unwrap();
    let kn = units.get("kn").unwrap();
    assert_eq!(units.convert(100.0, rpm, kn), None);
}
