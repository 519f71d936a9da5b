//! Laws over generated assemblies and catalogs.
//!
//! Every operator, aggregation mode and requirement form (fixed value, lookup
//! row, lookup default) is drawn against small graphs with missing values,
//! relationship fan-out and dangling links.

use proptest::prelude::*;
use shipval_catalog::{Catalog, ConstraintIntent};
use shipval_constraint::{CancellationToken, Evaluator, EvaluatorConfig, Finding, FindingStatus};
use shipval_core::Value;
use shipval_graph::{EntityGraph, GraphBuilder};
use shipval_normalize::{UnitDef, UnitTable};
use shipval_schema::SchemaStore;
use shipval_shape::{compile_all, ShapeValidator, ShapeVerdict};
use std::fmt::Write;

const SCHEMA: &str = r#"
version = "generated"

[quantity_kinds]
force = "kN"

[[classes]]
name = "Part"

[[classes.properties]]
id = "load"
range = { quantity = "force" }

[[classes]]
name = "Assembly"

[[classes.properties]]
id = "grade"
range = { enumeration = ["A", "B", "C"] }

[[classes.properties]]
id = "hasPart"
range = { class = "Part" }
cardinality = "0..*"
"#;

const LOADS: [f64; 3] = [10.0, 20.0, 30.0];
const GRADES: [&str; 3] = ["A", "B", "C"];
const OPERATORS: [&str; 7] = ["eq", "ge", "gt", "le", "lt", "hasValue", "exists"];

#[derive(Debug, Clone)]
struct AssemblySpec {
    grade: Option<&'static str>,
    parts: Vec<Option<f64>>,
    dangling: bool,
}

#[derive(Debug, Clone)]
enum RequiredSpec {
    Fixed(f64),
    Lookup {
        rows: Vec<(&'static str, f64)>,
        default: Option<f64>,
    },
}

#[derive(Debug, Clone)]
struct IntentSpec {
    operator: &'static str,
    aggregation: &'static str,
    required: RequiredSpec,
    guarded: bool,
}

fn load() -> impl Strategy<Value = f64> {
    prop::sample::select(LOADS.to_vec())
}

fn assembly() -> impl Strategy<Value = AssemblySpec> {
    (
        prop::option::of(prop::sample::select(GRADES.to_vec())),
        prop::collection::vec(prop::option::weighted(0.8, load()), 0..4),
        prop::bool::weighted(0.1),
    )
        .prop_map(|(grade, parts, dangling)| AssemblySpec {
            grade,
            parts,
            dangling,
        })
}

fn required() -> impl Strategy<Value = RequiredSpec> {
    prop_oneof![
        load().prop_map(RequiredSpec::Fixed),
        (
            prop::sample::subsequence(GRADES.to_vec(), 1..=3),
            prop::collection::vec(load(), 3),
            prop::option::of(load()),
        )
            .prop_map(|(keys, values, default)| RequiredSpec::Lookup {
                rows: keys.into_iter().zip(values).collect(),
                default,
            }),
    ]
}

fn intent() -> impl Strategy<Value = IntentSpec> {
    (
        prop::sample::select(OPERATORS.to_vec()),
        prop::sample::select(vec!["all", "any"]),
        required(),
        any::<bool>(),
    )
        .prop_map(|(operator, aggregation, required, guarded)| IntentSpec {
            operator,
            aggregation,
            required,
            guarded,
        })
}

fn schema() -> SchemaStore {
    SchemaStore::from_toml(SCHEMA).unwrap()
}

fn units() -> UnitTable {
    let mut units = UnitTable::new();
    units.add(UnitDef::new("kN", "force", 1.0)).unwrap();
    units
}

fn render_catalog(intents: &[IntentSpec]) -> String {
    let mut toml = String::from("version = \"generated\"\n");
    for (i, spec) in intents.iter().enumerate() {
        write!(
            toml,
            "\n[[constraints]]\nid = \"C{i:02}\"\ntarget = \"Assembly.hasPart.load\"\noperator = \"{}\"\naggregation = \"{}\"\nclause = \"G {i}\"\n",
            spec.operator, spec.aggregation
        )
        .unwrap();
        if spec.guarded {
            toml.push_str("applies_when = \"grade != C\"\n");
        }
        if spec.operator == "exists" {
            continue;
        }
        match &spec.required {
            RequiredSpec::Fixed(value) => writeln!(toml, "required = {value:?}").unwrap(),
            RequiredSpec::Lookup { rows, default } => {
                let rows: Vec<String> = rows.iter().map(|(k, v)| format!("{k} = {v:?}")).collect();
                write!(toml, "required = {{ lookup = \"grade\", table = {{ {} }}", rows.join(", ")).unwrap();
                if let Some(default) = default {
                    write!(toml, ", default = {default:?}").unwrap();
                }
                toml.push_str(" }\n");
            }
        }
    }
    toml
}

fn build_graph(schema: &SchemaStore, assemblies: &[AssemblySpec]) -> EntityGraph {
    let mut g = GraphBuilder::new(schema);
    for (i, spec) in assemblies.iter().enumerate() {
        let id = format!("a{i}");
        g.add_entity(id.as_str(), "Assembly").unwrap();
        if let Some(grade) = spec.grade {
            g.set(&id, "grade", Value::enumeration(grade)).unwrap();
        }
        for (j, load) in spec.parts.iter().enumerate() {
            let part = format!("{id}-p{j}");
            g.add_entity(part.as_str(), "Part").unwrap();
            if let Some(load) = load {
                g.set(&part, "load", Value::quantity(*load, "kN")).unwrap();
            }
            g.link(&id, "hasPart", part.as_str()).unwrap();
        }
        if spec.dangling {
            g.link(&id, "hasPart", format!("{id}-ghost").as_str()).unwrap();
        }
    }
    g.build().unwrap()
}

fn evaluate(schema: &SchemaStore, graph: &EntityGraph, catalog: &Catalog, config: EvaluatorConfig) -> Vec<Finding> {
    let intents: Vec<&ConstraintIntent> = catalog.constraints().collect();
    Evaluator::new(schema, graph)
        .with_config(config)
        .evaluate(&intents, &CancellationToken::new())
        .unwrap()
}

/// The status class a pair must land in before any value is compared.
#[derive(Debug, PartialEq)]
enum Expected {
    NotApplicable,
    MissingData,
    Evaluated,
}

fn expected(spec: &IntentSpec, assembly: &AssemblySpec) -> Expected {
    let applies = !spec.guarded || matches!(assembly.grade, Some("A" | "B"));
    if !applies {
        return Expected::NotApplicable;
    }
    match (&spec.required, spec.operator) {
        (_, "exists") | (RequiredSpec::Fixed(_), _) => Expected::Evaluated,
        (RequiredSpec::Lookup { rows, default }, _) => match assembly.grade {
            None => Expected::MissingData,
            Some(grade) if default.is_none() && !rows.iter().any(|(k, _)| *k == grade) => {
                Expected::NotApplicable
            }
            Some(_) => Expected::Evaluated,
        },
    }
}

fn verdict_of(status: FindingStatus) -> ShapeVerdict {
    match status {
        FindingStatus::Pass => ShapeVerdict::Conforms,
        FindingStatus::Violation | FindingStatus::Warning => ShapeVerdict::Violates,
        FindingStatus::MissingData => ShapeVerdict::Incomplete,
        FindingStatus::NotApplicable => ShapeVerdict::NotTargeted,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_generated_catalog_laws(
        assemblies in prop::collection::vec(assembly(), 1..5),
        intents in prop::collection::vec(intent(), 1..6),
    ) {
        // GIVEN a generated graph and catalog
        let schema = schema();
        let units = units();
        let catalog = Catalog::from_toml(&render_catalog(&intents), &schema, &units).unwrap();
        let graph = build_graph(&schema, &assemblies);

        // WHEN evaluating in parallel and sequentially, and validating shapes
        let parallel = evaluate(&schema, &graph, &catalog, EvaluatorConfig { parallel: true, batch_size: 2 });
        let sequential = evaluate(&schema, &graph, &catalog, EvaluatorConfig { parallel: false, batch_size: 1 });
        let shapes = compile_all(catalog.constraints()).unwrap();
        let verdicts = ShapeValidator::new(&schema, &graph).validate(&shapes);

        // THEN re-evaluation is byte-identical
        prop_assert_eq!(
            serde_json::to_string(&parallel).unwrap(),
            serde_json::to_string(&sequential).unwrap()
        );

        // AND there is exactly one finding per (constraint, assembly) pair
        prop_assert_eq!(parallel.len(), intents.len() * assemblies.len());

        for (i, spec) in intents.iter().enumerate() {
            for (j, assembly) in assemblies.iter().enumerate() {
                let (constraint, entity) = (format!("C{i:02}"), format!("a{j}"));
                let matching: Vec<&Finding> = parallel
                    .iter()
                    .filter(|f| f.constraint_id().as_str() == constraint && f.entity_id().as_str() == entity)
                    .collect();
                prop_assert_eq!(matching.len(), 1);
                let status = matching[0].status();

                // AND applicability, including the lookup row rules, holds
                match expected(spec, assembly) {
                    Expected::NotApplicable => prop_assert_eq!(status, FindingStatus::NotApplicable),
                    Expected::MissingData => prop_assert_eq!(status, FindingStatus::MissingData),
                    Expected::Evaluated => prop_assert_ne!(status, FindingStatus::NotApplicable),
                }

                // AND the shape validator reaches the same verdict
                let verdict = verdicts
                    .get(&(matching[0].constraint_id().clone(), matching[0].entity_id().clone()))
                    .copied()
                    .unwrap_or(ShapeVerdict::NotTargeted);
                prop_assert_eq!(verdict, verdict_of(status), "{} on {}: {:?}", constraint, entity, spec);
            }
        }
    }
}

// ========== TEST: generated catalog rendering ==========
#[test]
fn test_rendered_catalog_covers_every_form() {
    // GIVEN one intent per requirement form
    let intents = vec![
        IntentSpec {
            operator: "gt",
            aggregation: "any",
            required: RequiredSpec::Fixed(20.0),
            guarded: true,
        },
        IntentSpec {
            operator: "lt",
            aggregation: "all",
            required: RequiredSpec::Lookup {
                rows: vec![("A", 10.0)],
                default: Some(30.0),
            },
            guarded: false,
        },
        IntentSpec {
            operator: "exists",
            aggregation: "all",
            required: RequiredSpec::Fixed(10.0),
            guarded: false,
        },
    ];

    // WHEN loading the rendered catalog
    let catalog = Catalog::from_toml(&render_catalog(&intents), &schema(), &units()).unwrap();

    // THEN all three intents load and compile, the lookup with a default row
    assert_eq!(catalog.len(), 3);
    let shapes = compile_all(catalog.constraints()).unwrap();
    let ids: Vec<&str> = shapes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["C00Shape", "C01Shape#A", "C01Shape#default", "C02Shape"]);
}
