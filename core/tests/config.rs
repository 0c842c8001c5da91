//! Scenario file loading and batch solving.

use staffing_core::{config::ScenarioConfig, ErlangError, TimeUnit};
use std::io::Write;

const SCENARIOS: &str = r#"{
  "scenarios": [
    {
      "name": "weekday_peak",
      "request": {
        "calls_per_hour": 1000,
        "aht": 120,
        "max_occupancy": 0.85,
        "target_answer_time": 20,
        "target_service_level": 0.8,
        "shrinkage": 0.3
      }
    },
    {
      "name": "night_shift",
      "request": {
        "calls_per_hour": 90,
        "aht": 4.5,
        "aht_unit": "minutes",
        "agents": 9,
        "target_answer_time": 0.5,
        "target_service_level": 0.9
      }
    }
  ]
}"#;

#[test]
fn parses_scenarios_with_defaults() {
    let config = ScenarioConfig::from_json(SCENARIOS).unwrap();
    assert_eq!(config.scenarios.len(), 2);

    let peak = config.get("weekday_peak").expect("weekday_peak present");
    assert_eq!(peak.request.aht_unit, TimeUnit::Seconds);
    assert_eq!(peak.request.agents, None);

    let night = config.get("night_shift").expect("night_shift present");
    assert_eq!(night.request.aht_unit, TimeUnit::Minutes);
    assert_eq!(night.request.agents, Some(9));
    assert_eq!(night.request.shrinkage, None);
}

#[test]
fn solve_all_keeps_file_order() {
    let config = ScenarioConfig::from_json(SCENARIOS).unwrap();
    let solved = config.solve_all();

    assert_eq!(solved.len(), 2);
    assert_eq!(solved[0].0, "weekday_peak");
    assert_eq!(solved[1].0, "night_shift");

    let peak = solved[0].1.as_ref().expect("peak solves");
    assert_eq!(peak.agents, 40);
    assert_eq!(peak.agents_with_shrinkage, 58);

    let night = solved[1].1.as_ref().expect("night solves");
    assert_eq!(night.agents, 9);
}

#[test]
fn loads_from_disk() {
    let path = std::env::temp_dir().join(format!("staffing-scenarios-{}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(SCENARIOS.as_bytes()).unwrap();
    drop(file);

    let config = ScenarioConfig::load(&path).unwrap();
    assert_eq!(config.scenarios.len(), 2);

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_file_names_the_path() {
    let err = ScenarioConfig::load("/definitely/not/here.json").unwrap_err();
    match err {
        ErlangError::Config(msg) => assert!(msg.contains("/definitely/not/here.json"), "{msg}"),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let err = ScenarioConfig::from_json("{ \"scenarios\": [ oops ] }").unwrap_err();
    assert!(matches!(err, ErlangError::Serialization(_)));
}

#[test]
fn duplicate_names_rejected() {
    let json = r#"{ "scenarios": [
        { "name": "a", "request": { "calls_per_hour": 10, "aht": 60, "target_answer_time": 20, "target_service_level": 0.8 } },
        { "name": "a", "request": { "calls_per_hour": 20, "aht": 60, "target_answer_time": 20, "target_service_level": 0.8 } }
    ] }"#;
    let err = ScenarioConfig::from_json(json).unwrap_err();
    assert!(matches!(err, ErlangError::Config(ref msg) if msg.contains("duplicate")));
}

#[test]
fn invalid_request_names_the_scenario() {
    let json = r#"{ "scenarios": [
        { "name": "broken", "request": { "calls_per_hour": 10, "aht": 60, "target_answer_time": 20, "target_service_level": 0.8, "shrinkage": 1.0 } }
    ] }"#;
    let err = ScenarioConfig::from_json(json).unwrap_err();
    assert!(matches!(err, ErlangError::Config(ref msg) if msg.contains("broken")));
}

#[test]
fn default_test_scenarios_solve() {
    let config = ScenarioConfig::default_test();
    for (name, result) in config.solve_all() {
        let result = result.unwrap_or_else(|e| panic!("{name} failed: {e}"));
        assert!(result.agents_with_shrinkage >= result.agents);
    }
}
