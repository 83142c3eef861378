//! Driver configuration using Figment
//!
//! Configuration is loaded from (in order of precedence):
//! 1. Environment variables prefixed with `HP8131A_`
//! 2. TOML configuration file (default: `config/hp8131a.toml`)
//!
//! Nested keys are separated by a double underscore in environment variables:
//!
//! ```text
//! HP8131A_APPLICATION__LOG_LEVEL=debug
//! HP8131A_DEVICE__ADDRESS=/dev/ttyUSB1
//! HP8131A_DEVICE__SIMULATE=true
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hp8131a::config::DriverConfig;
//!
//! let config = DriverConfig::load()?;
//! println!("Device: {}", config.device.address);
//! # Ok::<(), hp8131a::config::ConfigError>(())
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/hp8131a.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration load error: {0}")]
    LoadError(#[from] Box<figment::Error>),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Top-level driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DriverConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Instrument link settings
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Instrument link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Serial port of the instrument (e.g., "/dev/ttyUSB0")
    #[serde(default = "default_address")]
    pub address: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Query timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Use the in-memory simulated instrument instead of the link
    #[serde(default)]
    pub simulate: bool,
    /// Terminator appended to every command line
    #[serde(default = "default_write_terminator")]
    pub write_terminator: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout(),
            simulate: false,
            write_terminator: default_write_terminator(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_name() -> String {
    "hp8131a".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_address() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_timeout() -> u64 {
    2000
}

fn default_write_terminator() -> String {
    "\n".to_string()
}

// ============================================================================
// Configuration Loading and Validation
// ============================================================================

impl DriverConfig {
    /// Load configuration from the default file and environment variables
    ///
    /// # Errors
    ///
    /// Returns a ConfigError if loading or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    ///
    /// # Errors
    ///
    /// Returns a ConfigError if the file is invalid or validation fails.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::extract(Self::figment(path.as_ref()))
    }

    /// Load configuration from a file with the simulated instrument forced on
    ///
    /// The override is applied before validation, so live-only settings such
    /// as an empty `device.address` do not cause a failure.
    ///
    /// # Errors
    ///
    /// Returns a ConfigError if the file is invalid or validation fails.
    pub fn load_simulated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::extract(
            Self::figment(path.as_ref()).merge(Serialized::default("device.simulate", true)),
        )
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(DriverConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("HP8131A_").split("__"))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(Box::new(e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// # Errors
    ///
    /// Returns a ConfigError with a descriptive message for any validation failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let device = &self.device;
        if !device.simulate && device.address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "'device.address' cannot be empty for a live device".to_string(),
            ));
        }
        if device.baud_rate == 0 {
            return Err(ConfigError::ValidationError(
                "'device.baud_rate' must be > 0".to_string(),
            ));
        }
        if device.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "'device.timeout_ms' must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
