//! Pure state transition function
//!
//! Given the same session snapshot and event, `transition` always produces
//! the same result, with no I/O side effects. The runtime applies the
//! returned snapshot and executes the returned effects.

use super::effect::Effect;
use super::event::{Event, InboundEvent, LifecycleOp};
use super::state::{
    ConvPhase, ConversationMessage, ConversationSession, FallbackPhase, MessageMetadata,
    MessageRole,
};
use thiserror::Error;

/// Result of a state transition.
#[derive(Debug)]
pub struct TransitionResult {
    pub session: ConversationSession,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: ConversationSession) -> Self {
        Self {
            session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors returned for commands that are invalid in the current phase.
/// Inbound transport events never error; out-of-phase pushes are absorbed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a conversation is already in progress")]
    AlreadyStarted,
    #[error("conversation is complete; reset to start a new one")]
    Completed,
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Pure transition function.
pub fn transition(
    session: &ConversationSession,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    // Reset is the universal escape hatch, valid from every phase. The
    // generation counter survives the reset so an ack still in flight
    // from before it can never match a post-reset command.
    if matches!(event, Event::Reset) {
        let mut next = ConversationSession::new();
        next.op_generation = session.op_generation;
        return Ok(TransitionResult::new(next));
    }

    // Terminal phase: nothing else is accepted. Commands error; pushes
    // cannot be rejected back to the server, so they are absorbed.
    if session.phase.is_terminal() {
        return match event {
            Event::Inbound(_) | Event::LifecycleAck { .. } => {
                Ok(TransitionResult::new(session.clone()))
            }
            _ => Err(TransitionError::Completed),
        };
    }

    match event {
        Event::Reset => unreachable!("handled above"),

        // ============================================================
        // User commands
        // ============================================================
        Event::Start { user_id } => {
            if session.phase != ConvPhase::Idle {
                return Err(TransitionError::AlreadyStarted);
            }
            let mut next = session.clone();
            next.phase = ConvPhase::Starting;
            next.error = None;
            next.op_generation += 1;
            let generation = next.op_generation;
            Ok(TransitionResult::new(next).with_effect(Effect::start_backend(user_id, generation)))
        }

        Event::Pause => {
            if session.phase != ConvPhase::Active {
                return Err(TransitionError::InvalidCommand(
                    "pause requires an active conversation".to_string(),
                ));
            }
            lifecycle_command(session, ConvPhase::Pausing, LifecycleOp::Pause)
        }

        Event::Resume => {
            if session.phase != ConvPhase::Paused {
                return Err(TransitionError::InvalidCommand(
                    "resume requires a paused conversation".to_string(),
                ));
            }
            lifecycle_command(session, ConvPhase::Resuming, LifecycleOp::Resume)
        }

        Event::Abandon => {
            let fallback = match session.phase {
                ConvPhase::Active | ConvPhase::Pausing => FallbackPhase::Active,
                ConvPhase::Paused | ConvPhase::Resuming => FallbackPhase::Paused,
                _ => {
                    return Err(TransitionError::InvalidCommand(
                        "abandon requires an active or paused conversation".to_string(),
                    ))
                }
            };
            lifecycle_command(session, ConvPhase::Abandoning { fallback }, LifecycleOp::Abandon)
        }

        Event::SendMessage { content } => {
            // Optimistic local echo; always appended. The outbound send
            // only happens while the dialogue is live.
            let message = ConversationMessage::new(MessageRole::User, content);
            let mut next = session.clone();
            next.messages.push(message.clone());
            if session.phase == ConvPhase::Active {
                // The assistant is composing a reply until the next
                // assistant_message arrives.
                next.is_composing = true;
                Ok(TransitionResult::new(next).with_effect(Effect::send_outbound(message)))
            } else {
                Ok(TransitionResult::new(next))
            }
        }

        // ============================================================
        // Backend acknowledgements
        // ============================================================
        Event::LifecycleAck {
            op,
            generation,
            outcome,
        } => {
            if generation != session.op_generation {
                // A newer command superseded this call; its resolution is
                // intentionally ignored.
                tracing::debug!(?op, generation, current = session.op_generation, "stale lifecycle ack dropped");
                return Ok(TransitionResult::new(session.clone()));
            }
            Ok(TransitionResult::new(apply_ack(session, op, outcome)))
        }

        // ============================================================
        // Inbound transport events
        // ============================================================
        Event::Inbound(inbound) => Ok(TransitionResult::new(apply_inbound(session, inbound))),
    }
}

fn lifecycle_command(
    session: &ConversationSession,
    next_phase: ConvPhase,
    op: LifecycleOp,
) -> Result<TransitionResult, TransitionError> {
    let Some(conversation_id) = session.conversation_id.clone() else {
        return Err(TransitionError::InvalidCommand(
            "no conversation id assigned yet".to_string(),
        ));
    };
    let mut next = session.clone();
    next.phase = next_phase;
    next.error = None;
    next.op_generation += 1;
    let generation = next.op_generation;
    Ok(TransitionResult::new(next)
        .with_effect(Effect::lifecycle_call(op, conversation_id, generation)))
}

fn apply_ack(
    session: &ConversationSession,
    op: LifecycleOp,
    outcome: Result<(), String>,
) -> ConversationSession {
    let mut next = session.clone();
    match (&session.phase, op, outcome) {
        // Start success is a no-op here: activation happens on the
        // conversation_started push. Failure falls back to idle.
        (ConvPhase::Starting, LifecycleOp::Start, Ok(())) => {}
        (ConvPhase::Starting, LifecycleOp::Start, Err(error)) => {
            next.phase = ConvPhase::Idle;
            next.error = Some(error);
        }

        (ConvPhase::Pausing, LifecycleOp::Pause, Ok(())) => next.phase = ConvPhase::Paused,
        (ConvPhase::Pausing, LifecycleOp::Pause, Err(error)) => {
            next.phase = ConvPhase::Active;
            next.error = Some(error);
        }

        (ConvPhase::Resuming, LifecycleOp::Resume, Ok(())) => next.phase = ConvPhase::Active,
        (ConvPhase::Resuming, LifecycleOp::Resume, Err(error)) => {
            next.phase = ConvPhase::Paused;
            next.error = Some(error);
        }

        // Abandon success is a full reset; the generation counter
        // survives, as with an explicit reset.
        (ConvPhase::Abandoning { .. }, LifecycleOp::Abandon, Ok(())) => {
            next = ConversationSession::new();
            next.op_generation = session.op_generation;
        }
        (ConvPhase::Abandoning { fallback }, LifecycleOp::Abandon, Err(error)) => {
            next.phase = match fallback {
                FallbackPhase::Active => ConvPhase::Active,
                FallbackPhase::Paused => ConvPhase::Paused,
            };
            next.error = Some(error);
        }

        // Ack arrived after the phase already converged by another path
        // (e.g. a server-initiated pause push). Absorb it.
        (phase, op, _) => {
            tracing::debug!(?phase, ?op, "lifecycle ack in non-matching phase, absorbed");
        }
    }
    next
}

fn apply_inbound(session: &ConversationSession, inbound: InboundEvent) -> ConversationSession {
    let mut next = session.clone();
    match inbound {
        InboundEvent::ConversationStarted { conversation_id } => {
            if session.phase == ConvPhase::Starting {
                next.conversation_id = Some(conversation_id);
                next.phase = ConvPhase::Active;
                next.error = None;
            } else {
                tracing::debug!(?session.phase, "conversation_started outside starting phase, absorbed");
            }
        }

        InboundEvent::AssistantMessage { content, metadata } => {
            if session.phase.accepts_transcript_events() {
                if let Some(meta) = &metadata {
                    if let Some(preview) = &meta.entity_preview {
                        next.entity_preview = Some(preview.clone());
                    }
                    if let Some(progress) = &meta.progress {
                        next.progress = progress.clone();
                    }
                }
                let mut message = ConversationMessage::new(MessageRole::Assistant, content);
                message.metadata = metadata;
                next.messages.push(message);
                next.is_composing = false;
            }
        }

        InboundEvent::ProgressUpdate { progress } => {
            if session.phase.accepts_transcript_events() {
                // Last write wins; snapshots are never merged.
                next.progress = progress;
            }
        }

        InboundEvent::ConversationCompleted {
            entity_id,
            entity_preview,
            message,
        } => {
            if session.phase.accepts_transcript_events() {
                next.phase = ConvPhase::Completed;
                next.is_composing = false;
                next.created_entity_id =
                    entity_id.or_else(|| extract_entity_id(entity_preview.as_ref()));
                if entity_preview.is_some() {
                    next.entity_preview = entity_preview;
                }
                let text = message
                    .unwrap_or_else(|| "Your story companion is ready.".to_string());
                next.messages
                    .push(ConversationMessage::new(MessageRole::System, text));
            }
        }

        InboundEvent::ValidationError { message } => {
            if session.phase.accepts_transcript_events() {
                next.messages
                    .push(ConversationMessage::new(MessageRole::System, message));
            }
        }

        // Crisis notices are advisory at this layer: they enter the
        // transcript with their metadata but never change the phase.
        InboundEvent::CrisisDetected {
            level,
            resources,
            message,
        } => {
            if session.phase.accepts_transcript_events() {
                let text = message.unwrap_or_else(|| {
                    "Support resources are available if you need them.".to_string()
                });
                let metadata = MessageMetadata {
                    crisis_level: level,
                    resources,
                    ..MessageMetadata::default()
                };
                next.messages.push(
                    ConversationMessage::new(MessageRole::System, text).with_metadata(metadata),
                );
            }
        }

        InboundEvent::ConversationPaused => {
            // Converges with the client's own pause path regardless of
            // whether the ack or the push arrives first.
            if matches!(
                session.phase,
                ConvPhase::Active | ConvPhase::Pausing | ConvPhase::Resuming
            ) {
                next.phase = ConvPhase::Paused;
            }
        }

        InboundEvent::Error { message } => {
            next.error = Some(message);
        }
    }
    next
}

fn extract_entity_id(preview: Option<&serde_json::Value>) -> Option<String> {
    let preview = preview?;
    for key in ["entity_id", "character_id", "id"] {
        if let Some(id) = preview.get(key).and_then(serde_json::Value::as_str) {
            return Some(id.to_string());
        }
    }
    None
}
