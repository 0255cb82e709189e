//! Conversation runtime executor

use super::traits::ConversationBackend;
use super::SessionUpdate;
use crate::conversation::{
    transition, ConversationSession, Effect, Event, InboundEvent, LifecycleOp,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Generic conversation runtime that works with any backend implementation.
///
/// Reducer application is atomic and strictly ordered: the loop owns the
/// session and applies one event at a time. Backend calls run in spawned
/// tasks and come back as [`Event::LifecycleAck`]s through the same
/// channel, so an in-flight call can never mutate state directly.
pub struct SessionRuntime<B>
where
    B: ConversationBackend + 'static,
{
    session: ConversationSession,
    backend: Arc<B>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    update_tx: broadcast::Sender<SessionUpdate>,
}

impl<B> SessionRuntime<B>
where
    B: ConversationBackend + 'static,
{
    pub fn new(
        backend: Arc<B>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        update_tx: broadcast::Sender<SessionUpdate>,
    ) -> Self {
        Self {
            session: ConversationSession::new(),
            backend,
            event_rx,
            event_tx,
            update_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("starting conversation runtime");
        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }
        tracing::info!("conversation runtime stopped");
    }

    /// Apply one event: pure transition, then effect execution.
    pub(crate) fn process_event(&mut self, event: Event) {
        let result = match transition(&self.session, event) {
            Ok(r) => r,
            Err(e) => {
                // Invalid commands are user-facing, not fatal.
                tracing::debug!(error = %e, "command rejected");
                let _ = self.update_tx.send(SessionUpdate::Rejected {
                    message: e.to_string(),
                });
                return;
            }
        };

        self.session = result.session;
        let _ = self.update_tx.send(SessionUpdate::Snapshot {
            session: self.session.clone(),
        });

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::CallBackend {
                op,
                conversation_id,
                user_id,
                generation,
            } => {
                let backend = Arc::clone(&self.backend);
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let outcome = match op {
                        LifecycleOp::Start => {
                            backend.start(user_id.as_deref().unwrap_or_default()).await
                        }
                        LifecycleOp::Pause => {
                            backend.pause(conversation_id.as_deref().unwrap_or_default()).await
                        }
                        LifecycleOp::Resume => {
                            backend.resume(conversation_id.as_deref().unwrap_or_default()).await
                        }
                        LifecycleOp::Abandon => {
                            backend.abandon(conversation_id.as_deref().unwrap_or_default()).await
                        }
                    };
                    if let Err(e) = &outcome {
                        tracing::warn!(?op, error = %e, "backend lifecycle call failed");
                    }
                    let ack = Event::LifecycleAck {
                        op,
                        generation,
                        outcome: outcome.map_err(|e| e.to_string()),
                    };
                    let _ = event_tx.send(ack).await;
                });
            }

            Effect::SendOutbound { message } => {
                let backend = Arc::clone(&self.backend);
                let event_tx = self.event_tx.clone();
                let conversation_id = self.session.conversation_id.clone().unwrap_or_default();
                tokio::spawn(async move {
                    if let Err(e) = backend.send_message(&conversation_id, &message).await {
                        tracing::warn!(error = %e, "outbound message send failed");
                        let _ = event_tx
                            .send(Event::Inbound(InboundEvent::Error {
                                message: e.to_string(),
                            }))
                            .await;
                    }
                });
            }
        }
    }
}
