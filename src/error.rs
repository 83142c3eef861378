//! Error types for the driver.
//!
//! `DriverError` is the error returned by every read, write and trigger
//! operation on an [`Hp8131a`](crate::instrument::Hp8131a) handle. Using the
//! `thiserror` crate it keeps each failure kind distinguishable so callers can
//! decide what is worth retrying:
//!
//! - **`UnknownParameter`**: the parameter name is not in the registry. This is a
//!   programming error in the caller and should not be retried.
//! - **`InvalidValue`** / **`IndexOutOfRange`**: the value was rejected by the
//!   parameter's domain. Nothing was sent to the instrument; the caller may retry
//!   with a corrected value.
//! - **`MalformedReply`**: the instrument answered a query with text that does not
//!   fit the parameter's domain.
//! - **`Transport`**: wraps [`TransportError`] unchanged. No retry happens at this
//!   layer.
//! - **`Config`**: configuration could not be loaded or failed validation
//!   (see [`Hp8131a::from_config_file`](crate::instrument::Hp8131a::from_config_file)).

use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Convenience alias for results using the driver error type.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Invalid value '{value}' for parameter '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    #[error("Index {index} out of range for parameter '{parameter}' ({len} choices)")]
    IndexOutOfRange {
        parameter: &'static str,
        index: i64,
        len: usize,
    },

    #[error("Malformed reply '{reply}' to query '{command}'")]
    MalformedReply { command: String, reply: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by a [`Transport`](crate::adapters::Transport) implementation.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Read timeout after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected EOF from device")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "instrument_serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Serial support not enabled. Rebuild with --features instrument_serial")]
    SerialFeatureDisabled,

    #[error("Device failure: {0}")]
    Device(String),
}
