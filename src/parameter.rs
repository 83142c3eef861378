//! Parameter registry for the HP 8131A.
//!
//! Every instrument setting the driver exposes is listed once in [`PARAMETERS`],
//! binding its name to the SCPI command header used for both writes
//! (`<command> <value>`) and queries (`<command>?`).
//!
//! The value domain of a parameter is inferred from its name:
//!
//! - `trigger_mode` is [`Domain::Enumerated`] over [`TRIGGER_MODES`]
//! - names containing `enabled` are [`Domain::BooleanLike`] (`OFF`/`ON`)
//! - everything else is [`Domain::Numeric`]

use std::fmt;

use crate::error::{DriverError, DriverResult};

/// Trigger-mode tokens, in index order.
pub const TRIGGER_MODES: &[&str] = &["AUTO", "TRIGGER", "GATE", "EWIDTH", "BURST"];

/// Tokens accepted by boolean-like parameters; index 0 is off.
pub const SWITCH_TOKENS: &[&str] = &["OFF", "ON"];

/// Name and command header of every registered parameter.
pub const PARAMETERS: &[(&str, &str)] = &[
    ("trigger_mode", ":INP:TRIG:MODE"),
    ("trigger_slope", ":INP:TRIG:SLOP"),
    ("trigger_level", ":INP:TRIG:THR"),
    ("trigger_ext_enabled", ":INP:TRIG:STAT"),
    ("period", ":PULS:TIM:PER"),
    ("width1", ":PULS1:TIM:WIDT"),
    ("delay1", ":PULS1:TIM:DEL"),
    ("low1", ":PULS1:LEVEL:LOW"),
    ("high1", ":PULS1:LEVEL:HIGH"),
    ("enabled1", ":OUTP1:PULS:STAT"),
    ("cenabled1", ":OUTP1:PULS:CST"),
    ("width2", ":PULS2:TIM:WIDT"),
    ("delay2", ":PULS2:TIM:DEL"),
    ("low2", ":PULS2:LEVEL:LOW"),
    ("high2", ":PULS2:LEVEL:HIGH"),
    ("enabled2", ":OUTP2:PULS:STAT"),
    ("cenabled2", ":OUTP2:PULS:CST"),
];

/// Set of values a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Any value convertible to a finite `f64`.
    Numeric,
    /// One of a fixed, index-addressable list of tokens.
    Enumerated(&'static [&'static str]),
    /// `OFF`/`ON`, or the integers 0/1.
    BooleanLike,
}

impl Domain {
    /// Infer the domain of a parameter from its name.
    pub fn infer(name: &str) -> Self {
        if name == "trigger_mode" {
            Domain::Enumerated(TRIGGER_MODES)
        } else if name.contains("enabled") {
            Domain::BooleanLike
        } else {
            Domain::Numeric
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Numeric => write!(f, "numeric"),
            Domain::Enumerated(tokens) => write!(f, "one of {}", tokens.join("|")),
            Domain::BooleanLike => write!(f, "{}", SWITCH_TOKENS.join("|")),
        }
    }
}

/// Registry entry binding a parameter name to its command and domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// Parameter name, unique across the registry.
    pub name: &'static str,
    /// SCPI command header.
    pub command: &'static str,
    /// Accepted values.
    pub domain: Domain,
}

impl ParameterDescriptor {
    /// Query form of the command (`<command>?`).
    pub fn query(&self) -> String {
        format!("{}?", self.command)
    }

    /// Full write line for an already encoded wire token.
    pub fn write_line(&self, token: &str) -> String {
        format!("{} {}", self.command, token)
    }
}

/// Look up a parameter by name.
///
/// # Errors
/// Returns [`DriverError::UnknownParameter`] if `name` is not registered.
pub fn resolve(name: &str) -> DriverResult<ParameterDescriptor> {
    PARAMETERS
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|&(name, command)| ParameterDescriptor {
            name,
            command,
            domain: Domain::infer(name),
        })
        .ok_or_else(|| DriverError::UnknownParameter(name.to_string()))
}

/// All registered parameters, in registry order.
pub fn descriptors() -> impl Iterator<Item = ParameterDescriptor> {
    PARAMETERS.iter().map(|&(name, command)| ParameterDescriptor {
        name,
        command,
        domain: Domain::infer(name),
    })
}
