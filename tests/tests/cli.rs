//! The `shipval` command over the fixture files.

use shipval_cli::{execute, Cli};
use shipval_tests::fixtures_dir;

fn cli(args: &[&str]) -> Cli {
    use clap::Parser;
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_validate_exits_with_failure() {
    let config = fixtures_dir().join("shipval.toml");
    let input = fixtures_dir().join("input.json");

    let (output, code) = execute(cli(&[
        "shipval",
        "validate",
        "--config",
        config.to_str().unwrap(),
        "--input",
        input.to_str().unwrap(),
    ]))
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(code, 1);
    assert_eq!(json["outcome"], "failure");
    assert_eq!(json["coverage"]["total"], 12);
}

#[test]
fn test_strict_flag_aborts() {
    let config = fixtures_dir().join("shipval.toml");
    let input = fixtures_dir().join("input.json");

    let (_, code) = execute(cli(&[
        "shipval",
        "validate",
        "--config",
        config.to_str().unwrap(),
        "--input",
        input.to_str().unwrap(),
        "--strict",
    ]))
    .unwrap();

    assert_eq!(code, 2);
}

#[test]
fn test_shapes_command() {
    let config = fixtures_dir().join("shipval.toml");

    let (output, code) = execute(cli(&["shipval", "shapes", "--config", config.to_str().unwrap()])).unwrap();

    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(code, 0);
    // the rudder lookup has three rows and no default
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "ICE-RUDDER-SPEEDShape#IA",
            "ICE-RUDDER-SPEEDShape#IAS",
            "ICE-RUDDER-SPEEDShape#IB",
            "PROP-CP-BOLTSShape",
            "PROP-NOZZLEShape",
            "PROP-SF-YIELDShape",
            "SHAFT-LOADSShape",
            "SHAFT-MCRShape",
        ]
    );
}
