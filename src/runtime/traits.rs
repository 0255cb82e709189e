//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::backend::BackendError;
use crate::conversation::ConversationMessage;
use async_trait::async_trait;
use std::sync::Arc;

/// Backend collaborator for conversation lifecycle calls and outbound
/// messages. Timeout and retry policy live behind this seam, not in the
/// state machine.
#[async_trait]
pub trait ConversationBackend: Send + Sync {
    /// Begin a new guided conversation for the user.
    async fn start(&self, user_id: &str) -> Result<(), BackendError>;

    /// Pause the conversation.
    async fn pause(&self, conversation_id: &str) -> Result<(), BackendError>;

    /// Resume a paused conversation.
    async fn resume(&self, conversation_id: &str) -> Result<(), BackendError>;

    /// Abandon the conversation; the backend discards its state.
    async fn abandon(&self, conversation_id: &str) -> Result<(), BackendError>;

    /// Send a user message over the transport.
    async fn send_message(
        &self,
        conversation_id: &str,
        message: &ConversationMessage,
    ) -> Result<(), BackendError>;
}

#[async_trait]
impl<T: ConversationBackend + ?Sized> ConversationBackend for Arc<T> {
    async fn start(&self, user_id: &str) -> Result<(), BackendError> {
        (**self).start(user_id).await
    }

    async fn pause(&self, conversation_id: &str) -> Result<(), BackendError> {
        (**self).pause(conversation_id).await
    }

    async fn resume(&self, conversation_id: &str) -> Result<(), BackendError> {
        (**self).resume(conversation_id).await
    }

    async fn abandon(&self, conversation_id: &str) -> Result<(), BackendError> {
        (**self).abandon(conversation_id).await
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &ConversationMessage,
    ) -> Result<(), BackendError> {
        (**self).send_message(conversation_id, message).await
    }
}
