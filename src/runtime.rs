//! Runtime for executing session state machines
//!
//! Both stores run single-threaded: every command or inbound event is
//! applied as one atomic reducer step in arrival order. Asynchronous work
//! (backend calls, transport sends) happens in spawned tasks that re-enter
//! the loop as acknowledgement events.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::ConversationBackend;

use crate::conversation::{ConversationSession, Event};
use crate::monitor::{MonitorCommand, MonitoringStore, TelemetryEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Snapshots and notices broadcast to UI subscribers of a conversation.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// The session after an applied reducer step
    Snapshot { session: ConversationSession },
    /// A command was invalid in the current phase and left state untouched
    Rejected { message: String },
}

/// Handle to interact with a running conversation session.
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub update_tx: broadcast::Sender<SessionUpdate>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.update_tx.subscribe()
    }
}

/// Start a conversation runtime on the current tokio runtime and return
/// its handle.
pub fn spawn_session_runtime<B>(backend: Arc<B>) -> SessionHandle
where
    B: ConversationBackend + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (update_tx, _) = broadcast::channel(128);

    let runtime = SessionRuntime::new(backend, event_rx, event_tx.clone(), update_tx.clone());
    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!("conversation runtime finished");
    });

    SessionHandle {
        event_tx,
        update_tx,
    }
}

// ============================================================================
// Monitoring pump
// ============================================================================

/// Input to the monitoring pump: telemetry from the push channel and
/// commands from the UI share one channel so ordering is preserved.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Telemetry(TelemetryEvent),
    Command(MonitorCommand),
}

/// Snapshots and notices broadcast to UI subscribers of the monitor.
#[derive(Debug, Clone)]
pub enum MonitorUpdate {
    Snapshot { store: MonitoringStore },
    Rejected { message: String },
}

/// Drains monitor events into a [`MonitoringStore`], broadcasting a
/// snapshot after every applied step. The push-channel subscription that
/// produces [`TelemetryEvent`]s is the transport layer's concern.
pub struct MonitorPump {
    store: MonitoringStore,
    event_rx: mpsc::Receiver<MonitorEvent>,
    update_tx: broadcast::Sender<MonitorUpdate>,
}

impl MonitorPump {
    pub fn new(
        store: MonitoringStore,
        event_rx: mpsc::Receiver<MonitorEvent>,
        update_tx: broadcast::Sender<MonitorUpdate>,
    ) -> Self {
        Self {
            store,
            event_rx,
            update_tx,
        }
    }

    pub async fn run(mut self) {
        while let Some(event) = self.event_rx.recv().await {
            match event {
                MonitorEvent::Telemetry(telemetry) => self.store.apply(telemetry),
                MonitorEvent::Command(command) => {
                    if let Err(e) = self.store.dispatch(command) {
                        tracing::warn!(error = %e, "monitor command rejected");
                        let _ = self.update_tx.send(MonitorUpdate::Rejected {
                            message: e.to_string(),
                        });
                        continue;
                    }
                }
            }
            let _ = self.update_tx.send(MonitorUpdate::Snapshot {
                store: self.store.clone(),
            });
        }
        tracing::info!("monitor pump stopped");
    }
}

/// Handle to a running monitoring pump.
pub struct MonitorHandle {
    pub event_tx: mpsc::Sender<MonitorEvent>,
    pub update_tx: broadcast::Sender<MonitorUpdate>,
}

impl MonitorHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorUpdate> {
        self.update_tx.subscribe()
    }
}

pub fn spawn_monitor_pump(store: MonitoringStore) -> MonitorHandle {
    let (event_tx, event_rx) = mpsc::channel(64);
    let (update_tx, _) = broadcast::channel(128);

    let pump = MonitorPump::new(store, event_rx, update_tx.clone());
    tokio::spawn(pump.run());

    MonitorHandle {
        event_tx,
        update_tx,
    }
}
