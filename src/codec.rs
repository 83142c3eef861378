//! Value codec: caller values to wire tokens and back.
//!
//! [`encode`] validates a [`RawValue`] against a parameter's [`Domain`] and
//! produces the exact token sent after the command header. [`decode`] turns a
//! reply from the instrument into a [`ParamValue`]. Invalid input is always
//! reported as an error; no default is ever substituted.

use serde::Serialize;
use std::fmt;

use crate::error::{DriverError, DriverResult};
use crate::parameter::{Domain, ParameterDescriptor, SWITCH_TOKENS};

/// A value as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// Interpret a command-line argument: integer if it parses as one, text otherwise.
    pub fn parse_arg(arg: &str) -> Self {
        match arg.trim().parse::<i64>() {
            Ok(i) => RawValue::Int(i),
            Err(_) => RawValue::Text(arg.to_string()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Int(i64::from(value))
    }
}

impl From<usize> for RawValue {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(i) => RawValue::Int(i),
            Err(_) => RawValue::Float(value as f64),
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Int(i64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// A validated value as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Token(String),
}

impl ParamValue {
    /// Numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Token(_) => None,
        }
    }

    /// Token text, if this is a token.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Number(_) => None,
            ParamValue::Token(token) => Some(token),
        }
    }

    /// Value a freshly simulated instrument reports for `domain`.
    pub fn default_for(domain: Domain) -> Self {
        match domain {
            Domain::Numeric => ParamValue::Number(0.0),
            Domain::Enumerated(tokens) => {
                ParamValue::Token(tokens.first().copied().unwrap_or_default().to_string())
            }
            Domain::BooleanLike => ParamValue::Token(SWITCH_TOKENS[0].to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Token(token) => write!(f, "{token}"),
        }
    }
}

impl PartialEq<f64> for ParamValue {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == Some(*other)
    }
}

impl PartialEq<&str> for ParamValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// Magnitudes written in plain decimal; anything outside uses exponent form.
const PLAIN_DECIMAL_RANGE: std::ops::Range<f64> = 1e-3..1e9;

fn format_number(number: f64) -> String {
    if number == 0.0 || PLAIN_DECIMAL_RANGE.contains(&number.abs()) {
        number.to_string()
    } else {
        format!("{number:E}")
    }
}

fn invalid(descriptor: &ParameterDescriptor, value: &RawValue, reason: impl Into<String>) -> DriverError {
    DriverError::InvalidValue {
        parameter: descriptor.name,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn select_token(
    descriptor: &ParameterDescriptor,
    tokens: &'static [&'static str],
    value: &RawValue,
) -> DriverResult<&'static str> {
    match value {
        RawValue::Int(index) => usize::try_from(*index)
            .ok()
            .and_then(|i| tokens.get(i).copied())
            .ok_or(DriverError::IndexOutOfRange {
                parameter: descriptor.name,
                index: *index,
                len: tokens.len(),
            }),
        RawValue::Text(text) => tokens
            .iter()
            .copied()
            .find(|token| *token == text.as_str())
            .ok_or_else(|| invalid(descriptor, value, format!("expected one of {}", tokens.join(", ")))),
        RawValue::Float(_) => Err(invalid(descriptor, value, "expected an index or a token")),
    }
}

/// Validate `value` against the descriptor's domain and produce its wire token.
///
/// # Errors
/// - [`DriverError::InvalidValue`] when the value does not fit the domain
/// - [`DriverError::IndexOutOfRange`] when an enumerated index is out of bounds
pub fn encode(descriptor: &ParameterDescriptor, value: &RawValue) -> DriverResult<String> {
    match descriptor.domain {
        Domain::Numeric => {
            let number = match value {
                RawValue::Int(i) => *i as f64,
                RawValue::Float(v) => *v,
                RawValue::Text(text) => text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| invalid(descriptor, value, "not a number"))?,
            };
            if !number.is_finite() {
                return Err(invalid(descriptor, value, "not a finite number"));
            }
            Ok(format_number(number))
        }
        Domain::Enumerated(tokens) => select_token(descriptor, tokens, value).map(str::to_string),
        Domain::BooleanLike => match value {
            RawValue::Int(0 | 1) | RawValue::Text(_) => {
                select_token(descriptor, SWITCH_TOKENS, value).map(str::to_string)
            }
            _ => Err(invalid(descriptor, value, "expected 0, 1, OFF or ON")),
        },
    }
}

/// Interpret a wire token according to the descriptor's domain.
///
/// Numeric tokens are parsed as `f64`; enumerated and boolean-like tokens are
/// returned as-is (surrounding whitespace removed).
///
/// # Errors
/// [`DriverError::MalformedReply`] if a numeric token does not parse.
pub fn decode(descriptor: &ParameterDescriptor, token: &str) -> DriverResult<ParamValue> {
    let token = token.trim();
    match descriptor.domain {
        Domain::Numeric => token
            .parse::<f64>()
            .map(ParamValue::Number)
            .map_err(|_| DriverError::MalformedReply {
                command: descriptor.query(),
                reply: token.to_string(),
            }),
        Domain::Enumerated(_) | Domain::BooleanLike => Ok(ParamValue::Token(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{resolve, TRIGGER_MODES};

    fn enc(name: &str, value: impl Into<RawValue>) -> DriverResult<String> {
        encode(&resolve(name).unwrap(), &value.into())
    }

    #[test]
    fn test_numeric_accepts_ints_floats_and_text() {
        assert_eq!(enc("width1", 12.5).unwrap(), "12.5");
        assert_eq!(enc("period", 100).unwrap(), "100");
        assert_eq!(enc("delay1", "2.5e-9").unwrap(), "2.5E-9");
        assert_eq!(enc("low1", " -0.5 ").unwrap(), "-0.5");
    }

    #[test]
    fn test_numeric_extreme_magnitudes_use_exponent() {
        assert_eq!(enc("width2", 1e-300).unwrap(), "1E-300");
        assert_eq!(enc("period", 2.0e9).unwrap(), "2E9");
        assert_eq!(enc("high1", -0.0001).unwrap(), "-1E-4");
        assert_eq!(enc("low2", 0.0).unwrap(), "0");
        assert_eq!(enc("period", 999_999_999).unwrap(), "999999999");
    }

    #[test]
    fn test_large_usize_is_not_clamped() {
        let token = enc("period", usize::MAX).unwrap();
        assert_eq!(token, format!("{:E}", usize::MAX as f64));
        assert_ne!(token, format!("{:E}", i64::MAX as f64));
        let period = resolve("period").unwrap();
        assert_eq!(decode(&period, &token).unwrap(), usize::MAX as f64);
        assert!(matches!(
            enc("trigger_mode", usize::MAX),
            Err(DriverError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_numeric_rejects_garbage() {
        assert!(matches!(
            enc("width1", "wide"),
            Err(DriverError::InvalidValue { parameter: "width1", .. })
        ));
        assert!(matches!(enc("width1", f64::NAN), Err(DriverError::InvalidValue { .. })));
        assert!(matches!(enc("high2", "inf"), Err(DriverError::InvalidValue { .. })));
    }

    #[test]
    fn test_enumerated_by_index() {
        for (i, token) in TRIGGER_MODES.iter().enumerate() {
            assert_eq!(enc("trigger_mode", i).unwrap(), *token);
        }
        assert_eq!(enc("trigger_mode", 1).unwrap(), enc("trigger_mode", TRIGGER_MODES[1]).unwrap());
    }

    #[test]
    fn test_enumerated_index_out_of_range() {
        assert!(matches!(
            enc("trigger_mode", 5),
            Err(DriverError::IndexOutOfRange { index: 5, len: 5, .. })
        ));
        assert!(matches!(
            enc("trigger_mode", -1),
            Err(DriverError::IndexOutOfRange { index: -1, .. })
        ));
    }

    #[test]
    fn test_enumerated_tokens_are_case_sensitive() {
        assert_eq!(enc("trigger_mode", "BURST").unwrap(), "BURST");
        assert!(matches!(enc("trigger_mode", "burst"), Err(DriverError::InvalidValue { .. })));
        assert!(matches!(enc("trigger_mode", "SINGLE"), Err(DriverError::InvalidValue { .. })));
        assert!(matches!(enc("trigger_mode", 1.0), Err(DriverError::InvalidValue { .. })));
    }

    #[test]
    fn test_boolean_like() {
        assert_eq!(enc("enabled1", 1).unwrap(), "ON");
        assert_eq!(enc("enabled1", 0).unwrap(), "OFF");
        assert_eq!(enc("enabled1", true).unwrap(), "ON");
        assert_eq!(enc("cenabled2", "OFF").unwrap(), "OFF");
        assert_eq!(enc("enabled1", 1).unwrap(), enc("enabled1", "ON").unwrap());
    }

    #[test]
    fn test_boolean_like_rejects_other_values() {
        assert!(matches!(enc("enabled1", "MAYBE"), Err(DriverError::InvalidValue { .. })));
        assert!(matches!(enc("enabled1", 2), Err(DriverError::InvalidValue { .. })));
        assert!(matches!(enc("enabled1", "on"), Err(DriverError::InvalidValue { .. })));
        assert!(matches!(enc("enabled1", 1.0), Err(DriverError::InvalidValue { .. })));
    }

    #[test]
    fn test_decode() {
        let width = resolve("width1").unwrap();
        assert_eq!(decode(&width, "+1.25000E-08\n").unwrap(), 1.25e-8);
        assert!(matches!(decode(&width, "ERR"), Err(DriverError::MalformedReply { .. })));

        let mode = resolve("trigger_mode").unwrap();
        assert_eq!(decode(&mode, "TRIG").unwrap(), "TRIG");
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(RawValue::parse_arg("3"), RawValue::Int(3));
        assert_eq!(RawValue::parse_arg("3.5"), RawValue::Text("3.5".to_string()));
        assert_eq!(RawValue::parse_arg("ON"), RawValue::Text("ON".to_string()));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ParamValue::default_for(Domain::Numeric), 0.0);
        assert_eq!(ParamValue::default_for(Domain::Enumerated(TRIGGER_MODES)), "AUTO");
        assert_eq!(ParamValue::default_for(Domain::BooleanLike), "OFF");
    }
}
