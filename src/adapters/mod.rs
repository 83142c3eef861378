//! Transport adapters
//!
//! This module contains implementations of the [`Transport`] trait, the
//! line-oriented link the driver uses to talk to the instrument.

pub mod mock_adapter;
pub mod serial_adapter;

pub use mock_adapter::MockAdapter;
pub use serial_adapter::{SerialAdapter, SerialSettings};

use crate::error::TransportError;

/// Blocking, line-oriented request/response link to an instrument.
///
/// Implementations append their own line terminator to outgoing commands and
/// strip it from replies.
pub trait Transport: Send {
    /// Send a command and block until a reply line arrives.
    fn query(&mut self, command: &str) -> Result<String, TransportError>;

    /// Send a command without waiting for a reply.
    fn send(&mut self, command: &str) -> Result<(), TransportError>;

    /// Short description of the link for diagnostics.
    fn info(&self) -> String;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        (**self).query(command)
    }

    fn send(&mut self, command: &str) -> Result<(), TransportError> {
        (**self).send(command)
    }

    fn info(&self) -> String {
        (**self).info()
    }
}
