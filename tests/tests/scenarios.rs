//! Scenario tests over the fixture ship.

use pretty_assertions::assert_eq;
use serde_json::json;
use shipval_tests::prelude::*;

mod fixture_ship {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("fixture_ship")
            .expect("ICE-RUDDER-SPEED", "R1", FindingStatus::Violation)
            .expect("ICE-RUDDER-SPEED", "R2", FindingStatus::NotApplicable)
            .expect("PROP-CP-BOLTS", "P1", FindingStatus::Violation)
            .expect("PROP-CP-BOLTS", "P2", FindingStatus::NotApplicable)
            .expect("PROP-NOZZLE", "P1", FindingStatus::NotApplicable)
            .expect("PROP-NOZZLE", "P2", FindingStatus::Warning)
            .expect("PROP-SF-YIELD", "P1", FindingStatus::Pass)
            .expect("PROP-SF-YIELD", "P2", FindingStatus::NotApplicable)
            .expect("SHAFT-LOADS", "S1", FindingStatus::Pass)
            .expect("SHAFT-LOADS", "S2", FindingStatus::MissingData)
            .expect("SHAFT-MCR", "S1", FindingStatus::Pass)
            .expect("SHAFT-MCR", "S2", FindingStatus::MissingData)
            .outcome(RunOutcome::Failure)
    }

    // ========== TEST: fixture_ship_findings ==========
    #[test]
    fn test_fixture_ship_findings() {
        // GIVEN the fixture ship and catalog
        // WHEN validating in lenient mode
        let report = scenario().run().unwrap();

        // THEN every (constraint, entity) pair has exactly one finding, in order
        let pairs: Vec<(String, String)> = report
            .findings
            .iter()
            .map(|f| (f.constraint_id().to_string(), f.entity_id().to_string()))
            .collect();
        let mut sorted = pairs.clone();
        sorted.sort();
        assert_eq!(pairs, sorted);
        assert_eq!(pairs.len(), 12);
    }

    #[test]
    fn test_coverage_summary() {
        let report = scenario().run().unwrap();

        let c = &report.coverage;
        assert_eq!((c.total, c.passed, c.violated, c.warned), (12, 3, 2, 1));
        assert_eq!((c.missing_data, c.not_applicable), (2, 4));
        assert_eq!(c.coverage, 1.0);
        assert_eq!(c.data_coverage, 0.75);
    }

    #[test]
    fn test_ranked_order() {
        let report = scenario().run().unwrap();

        let ranked: Vec<(&str, &str)> = report
            .ranked
            .iter()
            .map(|f| (f.constraint_id().as_str(), f.entity_id().as_str()))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("ICE-RUDDER-SPEED", "R1"),
                ("PROP-CP-BOLTS", "P1"),
                ("PROP-NOZZLE", "P2"),
                ("SHAFT-LOADS", "S2"),
                ("SHAFT-MCR", "S2"),
            ]
        );
    }

    #[test]
    fn test_normalization_report() {
        let report = scenario().run().unwrap();

        let summary = &report.normalization.summary;
        assert_eq!(summary.total, 27);
        assert_eq!(summary.out_of_domain, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.fuzzy, 2);
        assert_eq!(summary.needs_review, 1);

        let colour = report
            .normalization
            .for_entity("R1")
            .find(|f| f.raw_label == "Colour")
            .unwrap();
        assert_eq!(colour.resolution_status, ResolutionStatus::Unresolved);
        assert!(!colour.candidate_scores.is_empty());
    }
}

mod fuzzy_engine_power {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: scenario_1_fuzzy_label_resolves ==========
    #[test]
    fn test_fuzzy_label_resolves_to_engine_power() {
        // GIVEN raw field "Powerrrr" = 5000 kW
        // WHEN normalizing the fixture ship
        let report = fixture_ship::scenario().run().unwrap();

        // THEN it resolves to mcrPower with {5000, kW}
        let field = report
            .normalization
            .for_entity("ME1")
            .find(|f| f.raw_label == "Powerrrr")
            .unwrap();
        assert_eq!(field.resolution_status, ResolutionStatus::Fuzzy);
        assert_eq!(field.resolved_property.as_ref().unwrap().as_str(), "mcrPower");
        assert_eq!(field.normalized_value, Some(Value::quantity(5000.0, "kW")));
        assert!(field.needs_review);
    }

    #[test]
    fn test_unit_inferred_from_label_suffix() {
        let report = fixture_ship::scenario().run().unwrap();

        let field = report
            .normalization
            .for_entity("S1")
            .find(|f| f.raw_label == "designTorque_kNm")
            .unwrap();
        assert_eq!(field.resolved_property.as_ref().unwrap().as_str(), "designTorque");
        assert_eq!(field.normalized_value, Some(Value::quantity(850.0, "kNm")));
    }
}

mod rudder_ice_speed {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: scenario_2_rudder_speed_violation ==========
    #[test]
    fn test_rudder_speed_below_ice_class_minimum() {
        // GIVEN a rudder with iceClass IA and design speed 15 kn
        let input = json!({
            "entities": [{ "id": "R1", "class": "Rudder" }],
            "records": [
                { "entity": "R1", "label": "iceClass", "value": "IA" },
                { "entity": "R1", "label": "rudderDesignSpeed", "value": 15, "unit": "kn" }
            ]
        });

        // WHEN validating against the ice rules
        let report = Scenario::new("rudder_ice_speed")
            .input(input)
            .requirement_set("ICE")
            .expect("ICE-RUDDER-SPEED", "R1", FindingStatus::Violation)
            .outcome(RunOutcome::Failure)
            .run()
            .unwrap();

        // THEN the finding cites the clause, 15 kn against 18 kn
        let finding = &report.findings[0];
        assert_eq!(finding.regulation_clause(), "FSICR 3.2.2");
        assert_eq!(finding.actual_value(), Some(&Value::quantity(15.0, "kn")));
        assert_eq!(finding.required_value(), Some(&Value::quantity(18.0, "kn")));
        assert_eq!(
            finding.message(),
            "Rudder R1: design speed 15 kn below 18 kn for its ice class (FSICR 3.2.2)"
        );
    }

    #[test]
    fn test_speed_in_other_unit_is_converted() {
        // 10 m/s is about 19.4 kn
        let input = json!({
            "entities": [{ "id": "R1", "class": "Rudder" }],
            "records": [
                { "entity": "R1", "label": "Ice class", "value": "ia" },
                { "entity": "R1", "label": "Rudder speed", "value": 10, "unit": "m/s" }
            ]
        });

        Scenario::new("rudder_speed_si")
            .input(input)
            .requirement_set("ICE")
            .expect("ICE-RUDDER-SPEED", "R1", FindingStatus::Pass)
            .outcome(RunOutcome::Success)
            .run()
            .unwrap();
    }

    #[test]
    fn test_missing_ice_class_is_missing_data() {
        let input = json!({
            "entities": [{ "id": "R1", "class": "Rudder" }],
            "records": [
                { "entity": "R1", "label": "rudderDesignSpeed", "value": 25, "unit": "kn" }
            ]
        });

        Scenario::new("rudder_no_ice_class")
            .input(input)
            .requirement_set("ICE")
            .expect("ICE-RUDDER-SPEED", "R1", FindingStatus::MissingData)
            .run()
            .unwrap();
    }
}

mod cp_propeller_bolts {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: scenario_3_cp_bolt_design ==========
    #[test]
    fn test_cp_propeller_without_fex_bolt_design() {
        // GIVEN a CP propeller whose bolts are not designed for Fex
        let input = json!({
            "entities": [{ "id": "P1", "class": "Propeller" }],
            "records": [
                { "entity": "P1", "label": "pitchType", "value": "CP" },
                { "entity": "P1", "label": "boltDesignForFex", "value": false }
            ]
        });

        // WHEN / THEN the CP-bolt constraint is violated
        let report = Scenario::new("cp_bolts")
            .input(input)
            .expect("PROP-CP-BOLTS", "P1", FindingStatus::Violation)
            .run()
            .unwrap();
        assert_eq!(report.findings[0].actual_value(), Some(&Value::Bool(false)));
        assert_eq!(report.findings[0].required_value(), Some(&Value::Bool(true)));
    }
}

mod safety_factor {
    use super::*;

    // ========== TEST: scenario_4_boundary_pass ==========
    #[test]
    fn test_safety_factor_on_the_boundary_passes() {
        // GIVEN an ice-strengthened propeller with safety factor exactly 1.3
        let input = json!({
            "entities": [{ "id": "P1", "class": "Propeller" }],
            "records": [
                { "entity": "P1", "label": "propellerIceClass", "value": "IB" },
                { "entity": "P1", "label": "safetyFactorExtremeYield", "value": 1.3 }
            ]
        });

        // WHEN / THEN the ≥ 1.3 constraint passes
        Scenario::new("sf_boundary")
            .input(input)
            .expect("PROP-SF-YIELD", "P1", FindingStatus::Pass)
            .run()
            .unwrap();
    }
}

mod open_propeller {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: scenario_5_not_applicable ==========
    #[test]
    fn test_ducted_only_constraint_on_open_propeller() {
        // GIVEN an open propeller
        let input = json!({
            "entities": [{ "id": "P1", "class": "Propeller" }],
            "records": [
                { "entity": "P1", "label": "propellerType", "value": "open" }
            ]
        });

        // WHEN / THEN the ducted-only constraint does not apply
        let report = Scenario::new("open_propeller")
            .input(input)
            .requirement_set("PROP")
            .expect("PROP-NOZZLE", "P1", FindingStatus::NotApplicable)
            .outcome(RunOutcome::Success)
            .run()
            .unwrap();
        assert_eq!(report.coverage.not_applicable, 1);
        assert_eq!(report.coverage.coverage, 1.0);
    }
}

mod strict_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: strict_mode_aborts ==========
    #[test]
    fn test_strict_mode_aborts_on_unresolved_label() {
        // GIVEN the fixture ship, which has an unresolvable "Colour" field
        // WHEN validating in strict mode
        let report = Scenario::new("strict")
            .strict()
            .outcome(RunOutcome::Aborted)
            .run()
            .unwrap();

        // THEN no findings are produced and the reason is recorded
        assert_eq!(report.abort_reason, Some(AbortReason::NormalizationFailed));
        assert!(report.findings.is_empty());
        assert_eq!(report.normalization.summary.unresolved, 1);
    }

    #[test]
    fn test_strict_mode_ignores_skipped_labels() {
        let input = json!({
            "entities": [{ "id": "P1", "class": "Propeller" }],
            "records": [
                { "entity": "P1", "label": "Remarks", "value": "none" },
                { "entity": "P1", "label": "propellerType", "value": "open" }
            ]
        });

        Scenario::new("strict_skip")
            .input(input)
            .strict()
            .outcome(RunOutcome::Success)
            .run()
            .unwrap();
    }
}

mod structural {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: xor_conflict_aborts ==========
    #[test]
    fn test_shaftline_with_propeller_and_thruster() {
        // GIVEN a shaftline linked to both a propeller and a thruster
        let input = json!({
            "entities": [
                { "id": "S1", "class": "Shaftline" },
                { "id": "P1", "class": "Propeller" },
                { "id": "T1", "class": "Thruster" }
            ],
            "records": [
                { "entity": "S1", "label": "hasPropeller", "value": "P1" },
                { "entity": "S1", "label": "hasThruster", "value": "T1" }
            ]
        });

        // WHEN validating
        let report = Scenario::new("xor_conflict")
            .input(input)
            .outcome(RunOutcome::Aborted)
            .run()
            .unwrap();

        // THEN the graph is rejected before evaluation
        assert_eq!(report.abort_reason, Some(AbortReason::InvalidGraph));
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_unknown_reference_is_recorded() {
        let input = json!({
            "entities": [
                { "id": "S1", "class": "Shaftline" },
                { "id": "T1", "class": "Thruster" }
            ],
            "records": [
                { "entity": "S1", "label": "hasThruster", "value": "T1" },
                { "entity": "S1", "label": "drivenBy", "value": "ME9" }
            ]
        });

        let report = Scenario::new("unknown_reference")
            .input(input)
            .requirement_set("PROP")
            .expect("SHAFT-MCR", "S1", FindingStatus::MissingData)
            .run()
            .unwrap();
        assert_eq!(report.normalization.issue_count(), 1);
    }
}
