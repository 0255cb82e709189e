//! Conversation state types

use crate::monitor::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle phase of a guided conversation.
///
/// `Pausing`, `Resuming` and `Abandoning` are transient: a backend call is
/// in flight and exactly one acknowledgement resolves it. `Completed` is
/// terminal; only a full reset returns to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvPhase {
    /// No conversation; ready to start
    #[default]
    Idle,

    /// Backend call in flight to begin the conversation
    Starting,

    /// Accepting inbound assistant messages and outbound user messages
    Active,

    /// Pause request in flight
    Pausing,

    /// Paused; resume or abandon to continue
    Paused,

    /// Resume request in flight
    Resuming,

    /// Abandon request in flight; on failure the session falls back to
    /// the phase it was abandoned from
    Abandoning { fallback: FallbackPhase },

    /// Terminal: the guided dialogue finished and produced its entity
    Completed,
}

/// Where an aborted abandon falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPhase {
    Active,
    Paused,
}

impl ConvPhase {
    /// Terminal phases accept no transitions except a full reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConvPhase::Completed)
    }

    /// True while the dialogue is live (including a pause in flight).
    pub fn is_active(&self) -> bool {
        matches!(self, ConvPhase::Active | ConvPhase::Pausing)
    }

    /// True while paused (including a resume in flight). Mutually
    /// exclusive with `is_active` by construction.
    pub fn is_paused(&self) -> bool {
        matches!(self, ConvPhase::Paused | ConvPhase::Resuming)
    }

    /// Phases in which inbound transcript events (assistant messages,
    /// progress, validation/crisis notices) are accepted.
    pub(crate) fn accepts_transcript_events(&self) -> bool {
        matches!(
            self,
            ConvPhase::Active
                | ConvPhase::Pausing
                | ConvPhase::Paused
                | ConvPhase::Resuming
                | ConvPhase::Abandoning { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Optional per-message metadata from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MessageMetadata {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub follow_up_suggestions: Vec<String>,
    #[serde(default)]
    pub progress: Option<ConversationProgress>,
    #[serde(default)]
    pub entity_preview: Option<Value>,
    #[serde(default)]
    pub crisis_level: Option<RiskLevel>,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// One turn in the guided dialogue. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Stage progress through the backend-defined stage sequence.
/// Snapshots always replace the prior value wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConversationProgress {
    #[serde(default)]
    pub current_stage: String,
    /// 0–100
    #[serde(default)]
    pub progress_percentage: u8,
    #[serde(default)]
    pub completed_stages: Vec<String>,
}

/// Full client-side snapshot of one guided conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConversationSession {
    pub phase: ConvPhase,
    /// Assigned by the backend on start; `None` before
    pub conversation_id: Option<String>,
    /// Unbounded full transcript, strict append order
    pub messages: Vec<ConversationMessage>,
    pub progress: ConversationProgress,
    /// Set only on successful completion
    pub created_entity_id: Option<String>,
    /// Updated progressively from message metadata, finalized on completion
    pub entity_preview: Option<Value>,
    /// Assistant "is composing" indicator: set when a user message goes
    /// out, cleared by the next assistant message
    pub is_composing: bool,
    /// Last surfaced command/transport failure
    pub error: Option<String>,
    /// Stamped onto lifecycle effects; acknowledgements carrying a
    /// different generation are ignored (a newer command superseded
    /// them). Survives resets so an ack from before the reset can never
    /// match a post-reset command
    pub op_generation: u64,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.phase.is_paused()
    }
}
