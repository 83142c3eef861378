//! Mock transport for testing
//!
//! Stands in for a live instrument link without any hardware. It provides:
//! - Scripted replies per query command
//! - Controllable failure injection
//! - A log of every line sent, for test verification
//!
//! Clones share state, so a test can keep one clone for inspection while a
//! device handle owns another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Transport;
use crate::error::TransportError;

/// Identity string the mock answers to `*IDN?` unless overridden.
pub const MOCK_IDENTITY: &str = "HEWLETT-PACKARD,HP8131A,0,MOCK";

/// Mock transport adapter
///
/// # Example
///
/// ```
/// use hp8131a::adapters::{MockAdapter, Transport};
///
/// let mut adapter = MockAdapter::new().with_reply(":PULS:TIM:PER?", "1.0E-06");
/// assert_eq!(adapter.query(":PULS:TIM:PER?").unwrap(), "1.0E-06");
/// assert_eq!(adapter.sent(), vec![":PULS:TIM:PER?"]);
/// ```
#[derive(Clone)]
pub struct MockAdapter {
    replies: Arc<Mutex<HashMap<String, String>>>,
    should_fail_next: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAdapter {
    /// Create a new mock adapter that only knows how to answer `*IDN?`
    pub fn new() -> Self {
        let mut replies = HashMap::new();
        replies.insert("*IDN?".to_string(), MOCK_IDENTITY.to_string());
        Self {
            replies: Arc::new(Mutex::new(replies)),
            should_fail_next: Arc::new(AtomicBool::new(false)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the reply for a query command
    pub fn with_reply(self, command: &str, reply: &str) -> Self {
        self.set_reply(command, reply);
        self
    }

    /// Script or replace the reply for a query command
    pub fn set_reply(&self, command: &str, reply: &str) {
        lock(&self.replies).insert(command.to_string(), reply.to_string());
    }

    /// Inject a failure for the next operation
    pub fn inject_next_failure(&self) {
        self.should_fail_next.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> Result<(), TransportError> {
        if self.should_fail_next.swap(false, Ordering::SeqCst) {
            Err(TransportError::Device("Injected failure".to_string()))
        } else {
            Ok(())
        }
    }

    /// Every line sent so far, queries included
    pub fn sent(&self) -> Vec<String> {
        lock(&self.sent).clone()
    }

    /// Clear the sent log
    pub fn clear_log(&self) {
        lock(&self.sent).clear();
    }

    fn log_line(&self, line: &str) {
        lock(&self.sent).push(line.to_string());
    }
}

impl Transport for MockAdapter {
    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        self.log_line(command);
        self.check_failure()?;
        lock(&self.replies)
            .get(command)
            .cloned()
            .ok_or_else(|| TransportError::Device(format!("No reply scripted for '{}'", command)))
    }

    fn send(&mut self, command: &str) -> Result<(), TransportError> {
        self.log_line(command);
        self.check_failure()
    }

    fn info(&self) -> String {
        "MockAdapter".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_adapter_identity() {
        let mut adapter = MockAdapter::new();
        assert_eq!(adapter.query("*IDN?").unwrap(), MOCK_IDENTITY);
    }

    #[test]
    fn test_mock_adapter_unscripted_query_fails() {
        let mut adapter = MockAdapter::new();
        let result = adapter.query(":PULS1:TIM:WIDT?");
        assert!(matches!(result, Err(TransportError::Device(_))));
    }

    #[test]
    fn test_mock_adapter_failure_injection() {
        let mut adapter = MockAdapter::new();
        adapter.inject_next_failure();
        assert!(adapter.send("*TRG").is_err());
        // Failure should be consumed
        assert!(adapter.send("*TRG").is_ok());
    }

    #[test]
    fn test_mock_adapter_clones_share_log() {
        let observer = MockAdapter::new();
        let mut adapter = observer.clone();
        adapter.send(":PULS:TIM:PER 100").unwrap();
        assert_eq!(observer.sent(), vec![":PULS:TIM:PER 100"]);
        observer.clear_log();
        assert!(adapter.sent().is_empty());
    }
}
