//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use broadleaf::config::AppConfig;
use serial_test::serial;
use std::path::PathBuf;

fn temp_config_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("broadleaf_config_tests").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("BLF_SIMULATION__DURATION", "12.5");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("BLF_SIMULATION__DURATION");
    assert_eq!(config.simulation.duration, 12.5);
}

#[test]
#[serial]
fn test_env_override_nested_physics() {
    std::env::set_var("BLF_PHYSICS__TERMINAL_VELOCITY", "30");
    std::env::set_var("BLF_DEBUG__LOG_LEVEL", "debug");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("BLF_PHYSICS__TERMINAL_VELOCITY");
    std::env::remove_var("BLF_DEBUG__LOG_LEVEL");

    assert_eq!(config.physics.terminal_velocity, 30.0);
    assert_eq!(config.debug.log_level, "debug");
    assert_eq!(config.physics.to_physics_config().terminal_velocity, 30.0);
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("BLF_SIMULATION__DURATION");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load().unwrap();
    assert_eq!(config.simulation.scene, PathBuf::from("scenes/demo.ron"));
    assert_eq!(config.physics.gravity, [0.0, -9.81, 0.0]);
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = temp_config_dir("user_override");
    std::fs::write(dir.join("default.toml"), "[simulation]\nduration = 3.0\ntimestep = 0.02\n").unwrap();
    std::fs::write(dir.join("user.toml"), "[simulation]\nduration = 8.0\n").unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.simulation.duration, 8.0);
    assert_eq!(config.simulation.timestep, 0.02);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("/nonexistent/broadleaf/config").unwrap();
    assert_eq!(config.simulation.duration, 5.0);
    assert_eq!(config.debug.log_level, "info");
}

#[test]
#[serial]
fn test_invalid_value_is_an_error() {
    let dir = temp_config_dir("invalid_value");
    std::fs::write(dir.join("default.toml"), "[simulation]\nduration = \"forever\"\n").unwrap();
    let _ = std::fs::remove_file(dir.join("user.toml"));

    let err = AppConfig::load_from(&dir).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}
