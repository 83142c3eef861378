//! HP 8131A dual-channel pulse generator driver
//!
//! [`Hp8131a`] reads and writes the named parameters of the
//! [registry](crate::parameter) either over a live [`Transport`] or against an
//! in-memory [`SimulatedStore`]. Which of the two is used is decided when the
//! handle is built and never changes.
//!
//! ## Configuration
//!
//! ```toml
//! [device]
//! address = "/dev/ttyUSB0"
//! baud_rate = 9600
//! timeout_ms = 2000
//! simulate = false
//! ```
//!
//! ## Example
//!
//! ```
//! use hp8131a::instrument::Hp8131a;
//!
//! let mut pulser = Hp8131a::simulated();
//! pulser.write_parameter("width1", 12.5)?;
//! pulser.write_parameter("enabled1", "ON")?;
//! assert_eq!(pulser.read_parameter("width1")?, 12.5);
//! # Ok::<(), hp8131a::error::DriverError>(())
//! ```

use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

use crate::adapters::{SerialAdapter, SerialSettings, Transport};
use crate::codec::{decode, encode, ParamValue, RawValue};
use crate::config::{DeviceConfig, DriverConfig};
use crate::error::DriverResult;
use crate::parameter::{descriptors, resolve, ParameterDescriptor, SWITCH_TOKENS, TRIGGER_MODES};

/// Identity query sent once when a live handle is built.
pub const IDENTIFY: &str = "*IDN?";

/// Trigger-now command, sent without parameters.
pub const TRIGGER_NOW: &str = "*TRG";

/// In-memory stand-in for the instrument's settings.
///
/// Holds the decoded value of every registered parameter. Values only change
/// through [`Hp8131a::write_parameter`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedStore {
    values: HashMap<&'static str, ParamValue>,
}

impl SimulatedStore {
    fn new() -> Self {
        let values = descriptors()
            .map(|d| (d.name, ParamValue::default_for(d.domain)))
            .collect();
        Self { values }
    }

    /// Stored value of a parameter
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    fn set(&mut self, name: &'static str, value: ParamValue) {
        self.values.insert(name, value);
    }
}

enum Backend {
    Live {
        transport: Box<dyn Transport>,
        identity: String,
    },
    Simulated(SimulatedStore),
}

/// Handle to one HP 8131A, live or simulated.
///
/// All operations block until the link has answered. A handle is not meant to
/// be shared between threads without external locking.
pub struct Hp8131a {
    backend: Backend,
}

impl Hp8131a {
    /// Create a handle backed by a simulated instrument.
    pub fn simulated() -> Self {
        info!("Acting as simulated HP 8131A; no instrument will be contacted");
        Self {
            backend: Backend::Simulated(SimulatedStore::new()),
        }
    }

    /// Create a live handle over an already opened transport.
    ///
    /// The instrument identity is queried once and logged.
    ///
    /// # Errors
    /// Returns a transport error if the identity query fails.
    pub fn with_transport(transport: impl Transport + 'static) -> DriverResult<Self> {
        let mut transport: Box<dyn Transport> = Box::new(transport);
        let identity = transport.query(IDENTIFY)?;
        info!("Connection to {} established on {}", identity, transport.info());
        Ok(Self {
            backend: Backend::Live {
                transport,
                identity,
            },
        })
    }

    /// Build a handle from device configuration.
    ///
    /// `simulate = true` yields a simulated handle; otherwise the serial port
    /// at `address` is opened and the identity queried.
    ///
    /// # Errors
    /// Fails fast if the port cannot be opened or does not answer.
    pub fn connect(config: &DeviceConfig) -> DriverResult<Self> {
        if config.simulate {
            return Ok(Self::simulated());
        }
        info!("Connecting to HP 8131A on {}", config.address);
        let adapter = SerialAdapter::open(SerialSettings::from(config))?;
        Self::with_transport(adapter)
    }

    /// Load a configuration file and build a handle from its `[device]` section.
    ///
    /// # Errors
    /// - `Config` if the file cannot be loaded or fails validation
    /// - the errors of [`Hp8131a::connect`]
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> DriverResult<Self> {
        let config = DriverConfig::load_from(path)?;
        Self::connect(&config.device)
    }

    /// Whether this handle talks to the simulated store.
    pub fn is_simulated(&self) -> bool {
        matches!(self.backend, Backend::Simulated(_))
    }

    /// Identity string reported by a live instrument.
    pub fn identity(&self) -> Option<&str> {
        match &self.backend {
            Backend::Live { identity, .. } => Some(identity),
            Backend::Simulated(_) => None,
        }
    }

    /// Simulated store, when running without hardware.
    pub fn simulated_store(&self) -> Option<&SimulatedStore> {
        match &self.backend {
            Backend::Simulated(store) => Some(store),
            Backend::Live { .. } => None,
        }
    }

    /// Read the current value of a parameter.
    ///
    /// # Errors
    /// - `UnknownParameter` if `name` is not registered
    /// - `MalformedReply` if a live numeric reply does not parse
    /// - `Transport` if the query fails
    pub fn read_parameter(&mut self, name: &str) -> DriverResult<ParamValue> {
        let descriptor = resolve(name)?;
        match &mut self.backend {
            Backend::Simulated(store) => Ok(store
                .get(descriptor.name)
                .cloned()
                .unwrap_or_else(|| ParamValue::default_for(descriptor.domain))),
            Backend::Live { transport, .. } => {
                let reply = transport.query(&descriptor.query())?;
                debug!("{} -> '{}'", descriptor.name, reply);
                decode(&descriptor, &reply)
            }
        }
    }

    /// Validate and write a parameter.
    ///
    /// Nothing is sent or stored if the value is rejected.
    ///
    /// # Errors
    /// - `UnknownParameter` if `name` is not registered
    /// - `InvalidValue` / `IndexOutOfRange` if the value does not fit the domain
    /// - `Transport` if the write fails
    pub fn write_parameter(&mut self, name: &str, value: impl Into<RawValue>) -> DriverResult<()> {
        let descriptor = resolve(name)?;
        let token = encode(&descriptor, &value.into())?;
        self.write_token(&descriptor, &token)
    }

    fn write_token(&mut self, descriptor: &ParameterDescriptor, token: &str) -> DriverResult<()> {
        match &mut self.backend {
            Backend::Simulated(store) => {
                let value = decode(descriptor, token)?;
                debug!("Simulated {} = {}", descriptor.name, value);
                store.set(descriptor.name, value);
                Ok(())
            }
            Backend::Live { transport, .. } => {
                transport.send(&descriptor.write_line(token))?;
                Ok(())
            }
        }
    }

    /// Fire a single trigger.
    ///
    /// Switches to triggered mode with the external trigger input enabled, then
    /// sends the trigger-now command. A simulated handle applies the two
    /// settings to its store and skips the trigger-now command.
    ///
    /// # Errors
    /// Propagates the first failing write.
    pub fn manual_trigger(&mut self) -> DriverResult<()> {
        self.write_parameter("trigger_mode", TRIGGER_MODES[1])?;
        self.write_parameter("trigger_ext_enabled", SWITCH_TOKENS[1])?;
        if let Backend::Live { transport, .. } = &mut self.backend {
            transport.send(TRIGGER_NOW)?;
            info!("Manual trigger sent");
        }
        Ok(())
    }

    /// Read every registered parameter in registry order.
    ///
    /// # Errors
    /// Stops at the first failing read.
    pub fn read_all(&mut self) -> DriverResult<Vec<(&'static str, ParamValue)>> {
        descriptors()
            .map(|d| self.read_parameter(d.name).map(|value| (d.name, value)))
            .collect()
    }
}
