//! Configuration loading tests
//!
//! These tests touch process environment variables and therefore run serially.

use hp8131a::config::{ConfigError, DriverConfig};
use hp8131a::{DriverError, Hp8131a};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Test loading a complete configuration file
#[test]
#[serial]
fn test_load_from_file() {
    let file = write_config(
        r#"
        [application]
        name = "bench pulser"
        log_level = "debug"

        [device]
        address = "/dev/ttyS3"
        baud_rate = 19200
        timeout_ms = 500
        simulate = true
        "#,
    );

    let config = DriverConfig::load_from(file.path()).unwrap();
    assert_eq!(config.application.name, "bench pulser");
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.device.address, "/dev/ttyS3");
    assert_eq!(config.device.baud_rate, 19200);
    assert_eq!(config.device.timeout_ms, 500);
    assert!(config.device.simulate);
    assert_eq!(config.device.write_terminator, "\n");

    let pulser = Hp8131a::connect(&config.device).unwrap();
    assert!(pulser.is_simulated());
}

/// Test that missing keys fall back to defaults
#[test]
#[serial]
fn test_partial_file_uses_defaults() {
    let file = write_config("[device]\nsimulate = true\n");
    let config = DriverConfig::load_from(file.path()).unwrap();
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.device.baud_rate, 9600);
    assert_eq!(config.device.timeout_ms, 2000);
}

/// Test that environment variables override the file
#[test]
#[serial]
fn test_env_override() {
    let file = write_config("[device]\naddress = \"/dev/ttyUSB0\"\nsimulate = false\n");
    std::env::set_var("HP8131A_DEVICE__SIMULATE", "true");
    std::env::set_var("HP8131A_DEVICE__BAUD_RATE", "4800");
    let result = DriverConfig::load_from(file.path());
    std::env::remove_var("HP8131A_DEVICE__SIMULATE");
    std::env::remove_var("HP8131A_DEVICE__BAUD_RATE");

    let config = result.unwrap();
    assert!(config.device.simulate);
    assert_eq!(config.device.baud_rate, 4800);
}

/// Test that validation failures surface as validation errors
#[test]
#[serial]
fn test_invalid_file_values() {
    let file = write_config("[application]\nlog_level = \"chatty\"\n");
    assert!(matches!(
        DriverConfig::load_from(file.path()),
        Err(ConfigError::ValidationError(_))
    ));

    let file = write_config("[device]\nbaud_rate = \"fast\"\n");
    assert!(matches!(
        DriverConfig::load_from(file.path()),
        Err(ConfigError::LoadError(_))
    ));
}

/// Test that forcing simulation skips live-only validation
#[test]
#[serial]
fn test_simulate_override_applies_before_validation() {
    let file = write_config("[device]\naddress = \"\"\nsimulate = false\n");
    assert!(matches!(
        DriverConfig::load_from(file.path()),
        Err(ConfigError::ValidationError(_))
    ));

    let config = DriverConfig::load_simulated(file.path()).unwrap();
    assert!(config.device.simulate);
    assert!(config.device.address.is_empty());
}

/// Test building a handle straight from a configuration file
#[test]
#[serial]
fn test_handle_from_config_file() {
    let file = write_config("[device]\nsimulate = true\n");
    let pulser = Hp8131a::from_config_file(file.path()).unwrap();
    assert!(pulser.is_simulated());

    let file = write_config("[application]\nlog_level = \"loud\"\n");
    assert!(matches!(
        Hp8131a::from_config_file(file.path()),
        Err(DriverError::Config(ConfigError::ValidationError(_)))
    ));
}
