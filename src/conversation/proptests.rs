//! Property-based tests for the conversation state machine
//!
//! These verify terminality, transcript ordering and generation-counter
//! invariants across arbitrary event streams.

use super::event::{Event, InboundEvent, LifecycleOp};
use super::state::{ConvPhase, ConversationProgress, ConversationSession};
use super::transition::transition;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_lifecycle_op() -> impl Strategy<Value = LifecycleOp> {
    prop_oneof![
        Just(LifecycleOp::Start),
        Just(LifecycleOp::Pause),
        Just(LifecycleOp::Resume),
        Just(LifecycleOp::Abandon),
    ]
}

fn arb_inbound() -> impl Strategy<Value = InboundEvent> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(|id| InboundEvent::ConversationStarted {
            conversation_id: id
        }),
        "[a-zA-Z ]{1,30}".prop_map(|content| InboundEvent::AssistantMessage {
            content,
            metadata: None
        }),
        ("[a-z]{1,10}", 0u8..=100).prop_map(|(stage, pct)| InboundEvent::ProgressUpdate {
            progress: ConversationProgress {
                current_stage: stage,
                progress_percentage: pct,
                completed_stages: vec![],
            }
        }),
        "[a-zA-Z ]{1,20}".prop_map(|message| InboundEvent::ValidationError { message }),
        Just(InboundEvent::ConversationPaused),
        "[a-z ]{1,20}".prop_map(|message| InboundEvent::Error { message }),
    ]
}

/// Non-reset events: commands, acks and pushes (excluding completion so
/// streams can be applied to already-terminal sessions meaningfully).
fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|user_id| Event::Start { user_id }),
        Just(Event::Pause),
        Just(Event::Resume),
        Just(Event::Abandon),
        "[a-zA-Z ]{1,20}".prop_map(|content| Event::SendMessage { content }),
        (arb_lifecycle_op(), 0u64..5, any::<bool>()).prop_map(|(op, generation, ok)| {
            Event::LifecycleAck {
                op,
                generation,
                outcome: if ok { Ok(()) } else { Err("failed".to_string()) },
            }
        }),
        arb_inbound().prop_map(Event::Inbound),
    ]
}

fn completed_session() -> ConversationSession {
    let mut session = ConversationSession::new();
    session.phase = ConvPhase::Completed;
    session.conversation_id = Some("c1".to_string());
    session.created_entity_id = Some("ch1".to_string());
    session.progress = ConversationProgress {
        current_stage: "finished".to_string(),
        progress_percentage: 100,
        completed_stages: vec!["introduction".to_string()],
    };
    session
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Once completed, no event stream changes the conversation id,
    /// transcript or progress; only an explicit reset does.
    #[test]
    fn completed_session_is_terminal(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut session = completed_session();
        let reference = session.clone();

        for event in events {
            if let Ok(result) = transition(&session, event) {
                session = result.session;
            }
        }

        prop_assert_eq!(&session.conversation_id, &reference.conversation_id);
        prop_assert_eq!(&session.messages, &reference.messages);
        prop_assert_eq!(&session.progress, &reference.progress);
        prop_assert_eq!(&session.created_entity_id, &reference.created_entity_id);
        prop_assert_eq!(&session.phase, &ConvPhase::Completed);

        let reset = transition(&session, Event::Reset).unwrap().session;
        prop_assert_eq!(&reset.phase, &ConvPhase::Idle);
        prop_assert!(reset.messages.is_empty());
        prop_assert!(reset.conversation_id.is_none());
        prop_assert!(reset.created_entity_id.is_none());
    }

    /// The transcript is append-only under arbitrary event streams: every
    /// prior message survives in place, in order, unless a full reset
    /// (abandon success) intervenes.
    #[test]
    fn transcript_is_append_only(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut session = ConversationSession::new();

        for event in events {
            let before = session.messages.clone();
            let Ok(result) = transition(&session, event.clone()) else {
                continue;
            };
            let after = &result.session.messages;

            let reset = after.is_empty() && !before.is_empty();
            if reset {
                // Only an abandon ack clears the transcript mid-stream.
                let abandon_ack = matches!(
                    event,
                    Event::LifecycleAck {
                        op: LifecycleOp::Abandon,
                        ..
                    }
                );
                prop_assert!(abandon_ack, "transcript cleared by {event:?}");
            } else {
                prop_assert!(after.len() >= before.len());
                prop_assert_eq!(&after[..before.len()], &before[..]);
            }
            session = result.session;
        }
    }

    /// Assistant messages processed in order appear in order.
    #[test]
    fn inbound_messages_keep_arrival_order(contents in proptest::collection::vec("[a-z]{1,10}", 1..15)) {
        let mut session = ConversationSession::new();
        session = transition(&session, Event::Start { user_id: "u1".to_string() })
            .unwrap()
            .session;
        session = transition(
            &session,
            Event::Inbound(InboundEvent::ConversationStarted {
                conversation_id: "c1".to_string(),
            }),
        )
        .unwrap()
        .session;

        for content in &contents {
            session = transition(
                &session,
                Event::Inbound(InboundEvent::AssistantMessage {
                    content: content.clone(),
                    metadata: None,
                }),
            )
            .unwrap()
            .session;
        }

        let transcript: Vec<&str> = session.messages.iter().map(|m| m.content.as_str()).collect();
        let expected: Vec<&str> = contents.iter().map(String::as_str).collect();
        prop_assert_eq!(transcript, expected);
    }

    /// Active and paused are never claimed simultaneously, whatever the
    /// event stream.
    #[test]
    fn active_and_paused_are_mutually_exclusive(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut session = ConversationSession::new();
        for event in events {
            if let Ok(result) = transition(&session, event) {
                session = result.session;
            }
            prop_assert!(!(session.is_active() && session.is_paused()));
        }
    }
}
