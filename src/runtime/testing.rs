//! Mock backend for testing
//!
//! Enables integration testing of the runtime without real I/O.

use super::traits::ConversationBackend;
use crate::backend::BackendError;
use crate::conversation::ConversationMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Mock conversation backend with queued failures, optional per-call
/// delays, and a record of every call made.
pub struct MockBackend {
    start_failures: Mutex<VecDeque<String>>,
    pause_delays: Mutex<VecDeque<Duration>>,
    /// Record of all lifecycle calls, as "op:argument"
    calls: Mutex<Vec<String>>,
    /// Record of all outbound message contents
    messages: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            start_failures: Mutex::new(VecDeque::new()),
            pause_delays: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failure for the next `start` call.
    pub fn fail_next_start(&self, error: impl Into<String>) {
        self.start_failures.lock().unwrap().push_back(error.into());
    }

    /// Delay the next `pause` call before it succeeds.
    pub fn delay_next_pause(&self, delay: Duration) {
        self.pause_delays.lock().unwrap().push_back(delay);
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn recorded_messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    fn record(&self, op: &str, argument: &str) {
        self.calls.lock().unwrap().push(format!("{op}:{argument}"));
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationBackend for MockBackend {
    async fn start(&self, user_id: &str) -> Result<(), BackendError> {
        self.record("start", user_id);
        match self.start_failures.lock().unwrap().pop_front() {
            Some(error) => Err(BackendError::server_error(error)),
            None => Ok(()),
        }
    }

    async fn pause(&self, conversation_id: &str) -> Result<(), BackendError> {
        self.record("pause", conversation_id);
        let delay = self.pause_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn resume(&self, conversation_id: &str) -> Result<(), BackendError> {
        self.record("resume", conversation_id);
        Ok(())
    }

    async fn abandon(&self, conversation_id: &str) -> Result<(), BackendError> {
        self.record("abandon", conversation_id);
        Ok(())
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &ConversationMessage,
    ) -> Result<(), BackendError> {
        self.record("send", conversation_id);
        self.messages.lock().unwrap().push(message.content.clone());
        Ok(())
    }
}
