//! Effects produced by state transitions
//!
//! Effects describe the I/O the runtime must perform; the transition
//! function itself never suspends or touches the network.

use super::event::LifecycleOp;
use super::state::ConversationMessage;

/// Effects to be executed after a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue a backend lifecycle call; the runtime feeds the result back
    /// as a `LifecycleAck` carrying the same generation
    CallBackend {
        op: LifecycleOp,
        /// `None` only for `Start`, which has no conversation id yet
        conversation_id: Option<String>,
        /// User id; set for `Start`
        user_id: Option<String>,
        generation: u64,
    },

    /// Send a locally-appended user message over the transport
    SendOutbound { message: ConversationMessage },
}

impl Effect {
    pub fn start_backend(user_id: impl Into<String>, generation: u64) -> Self {
        Effect::CallBackend {
            op: LifecycleOp::Start,
            conversation_id: None,
            user_id: Some(user_id.into()),
            generation,
        }
    }

    pub fn lifecycle_call(
        op: LifecycleOp,
        conversation_id: impl Into<String>,
        generation: u64,
    ) -> Self {
        Effect::CallBackend {
            op,
            conversation_id: Some(conversation_id.into()),
            user_id: None,
            generation,
        }
    }

    pub fn send_outbound(message: ConversationMessage) -> Self {
        Effect::SendOutbound { message }
    }
}
