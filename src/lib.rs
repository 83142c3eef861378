//! Driver library for the HP 8131A dual-channel pulse generator.
//!
//! Instrument settings (trigger mode, pulse timing, levels, output enables)
//! are exposed as named parameters. Each name resolves through the
//! [`parameter`] registry to a SCPI command header, values are validated by the
//! [`codec`], and the [`instrument::Hp8131a`] handle either sends the command
//! over a [`adapters::Transport`] or applies it to an in-memory simulated store.

pub mod adapters;
pub mod codec;
pub mod config;
pub mod error;
pub mod instrument;
pub mod parameter;

pub use codec::{ParamValue, RawValue};
pub use error::{DriverError, DriverResult, TransportError};
pub use instrument::Hp8131a;
