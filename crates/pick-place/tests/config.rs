use std::io::Write;
use std::time::Duration;

use pick_place::{ConfigError, SimConfig, Simulation, Vec3};

#[test]
fn defaults_match_the_reference_cell() {
    let config = SimConfig::default();
    assert_eq!(config.object_detect_success, 0.8);
    assert_eq!(config.move_success, 0.9);
    assert_eq!(config.grasp_success, 0.9);
    assert_eq!(config.slip_probability, 0.3);
    assert_eq!(config.force_detect_success, 0.9);
    assert_eq!(config.object_position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(config.target_position, Vec3::new(5.0, 5.0, 5.0));
    assert_eq!(config.home_position, Vec3::new(15.0, 15.0, 15.0));
    assert_eq!(config.grasp_offset_z, 0.1);
    assert_eq!(config.grasp_tolerance, 0.1);
    assert!(config.validate().is_ok());
}

#[test]
fn partial_yaml_keeps_defaults_for_missing_fields() {
    let config = SimConfig::from_yaml_str(
        r#"
slip_probability: 1.0
target_position: { x: 2, y: 3, z: 4 }
max_ticks: 50
seed: 7
"#,
    )
    .unwrap();

    assert_eq!(config.slip_probability, 1.0);
    assert_eq!(config.target_position, Vec3::new(2.0, 3.0, 4.0));
    assert_eq!(config.max_ticks, Some(50));
    assert_eq!(config.seed, 7);
    assert_eq!(config.move_success, SimConfig::default().move_success);
}

#[test]
fn out_of_range_probability_is_rejected() {
    let config = SimConfig {
        grasp_success: 1.5,
        ..SimConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::ProbabilityOutOfRange {
            field: "grasp_success",
            value: 1.5,
        })
    );
    assert!(Simulation::new(&config).is_err());
}

#[test]
fn tolerance_and_runs_are_checked() {
    let zero_tolerance = SimConfig {
        grasp_tolerance: 0.0,
        ..SimConfig::default()
    };
    assert!(matches!(
        zero_tolerance.validate(),
        Err(ConfigError::NotPositive { field: "grasp_tolerance", .. })
    ));

    let no_runs = SimConfig {
        max_num_runs: 0,
        ..SimConfig::default()
    };
    assert_eq!(no_runs.validate(), Err(ConfigError::NoRuns));
}

#[test]
fn invalid_yaml_values_fail_to_load() {
    let err = SimConfig::from_yaml_str("slip_probability: -0.1\n").unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("slip_probability"), "{message}");
}

#[test]
fn load_reads_a_file_and_names_it_on_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_num_runs: 4\ntick_interval_ms: 5").unwrap();

    let config = SimConfig::load(file.path()).unwrap();
    assert_eq!(config.max_num_runs, 4);

    let runner = config.runner_config();
    assert_eq!(runner.max_attempts, 4);
    assert_eq!(runner.tick_interval, Duration::from_millis(5));
    assert_eq!(runner.max_ticks, None);

    let missing = file.path().with_extension("missing");
    let err = SimConfig::load(&missing).unwrap_err();
    assert!(format!("{err}").contains("Failed to read config"));
}

#[test]
fn config_round_trips_through_yaml() {
    let config = SimConfig {
        max_ticks: Some(12),
        ..SimConfig::deterministic()
    };
    let yaml = serde_yaml::to_string(&config).unwrap();
    assert_eq!(SimConfig::from_yaml_str(&yaml).unwrap(), config);
}
