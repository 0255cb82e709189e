//! Events that drive the conversation state machine
//!
//! One enum covers user commands, backend-call acknowledgements and
//! inbound transport events, so the reducer has a single serialized input
//! stream and messages are applied in strict arrival order.

use super::state::{ConversationProgress, MessageMetadata};
use crate::monitor::RiskLevel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which lifecycle call an acknowledgement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleOp {
    Start,
    Pause,
    Resume,
    Abandon,
}

/// Events that trigger state transitions.
#[derive(Debug, Clone)]
pub enum Event {
    // User commands
    Start {
        user_id: String,
    },
    Pause,
    Resume,
    Abandon,
    /// Optimistic local echo of a user message; the outbound send happens
    /// as an effect
    SendMessage {
        content: String,
    },
    /// Escape hatch: full return to idle without a backend round trip
    Reset,

    /// Exactly one per issued lifecycle effect; `generation` identifies
    /// the command that caused it
    LifecycleAck {
        op: LifecycleOp,
        generation: u64,
        outcome: Result<(), String>,
    },

    /// Single dispatch point for all inbound transport events
    Inbound(InboundEvent),
}

/// Typed inbound transport events, decoded at the transport boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    ConversationStarted {
        conversation_id: String,
    },
    AssistantMessage {
        content: String,
        #[serde(default)]
        metadata: Option<MessageMetadata>,
    },
    ProgressUpdate {
        progress: ConversationProgress,
    },
    ConversationCompleted {
        #[serde(default)]
        entity_id: Option<String>,
        #[serde(default, alias = "character_preview")]
        entity_preview: Option<Value>,
        #[serde(default)]
        message: Option<String>,
    },
    ValidationError {
        message: String,
    },
    CrisisDetected {
        #[serde(default)]
        level: Option<RiskLevel>,
        #[serde(default)]
        resources: Vec<String>,
        #[serde(default)]
        message: Option<String>,
    },
    /// Server-initiated pause; converges on the same state as the client's
    /// own pause command
    ConversationPaused,
    Error {
        message: String,
    },
}
