//! Guided-conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! commands and inbound transport events go through [`transition`], which
//! returns the next session snapshot plus the effects the runtime must
//! execute (backend lifecycle calls, outbound message sends).

pub mod effect;
pub mod event;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, InboundEvent, LifecycleOp};
pub use state::{
    ConvPhase, ConversationMessage, ConversationProgress, ConversationSession, MessageMetadata,
    MessageRole,
};
pub use transition::{transition, TransitionError, TransitionResult};
