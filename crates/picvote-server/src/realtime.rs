//! Real-time fan-out of ledger deltas.
//!
//! A single broadcast channel carries every [`RealtimeEvent`]; each
//! WebSocket client holds a receiver and forwards events as JSON text
//! frames. Delivery is best-effort and unordered across independently
//! connected viewers: a client that lags far enough behind is dropped by
//! the channel and must resync from the read views.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use picvote_shared::events::RealtimeEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Fire-and-forget broadcast hub for ledger deltas.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Emit an event to all connected viewers.
    ///
    /// Returns the number of subscribers that received it; zero viewers is
    /// not an error.
    pub fn emit(&self, event: RealtimeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }

    #[allow(dead_code)]
    pub fn viewer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-connection loop: forward broadcast events until the peer goes away.
///
/// The contract is server-to-client only; incoming frames other than close
/// are ignored.
pub async fn client_loop(socket: WebSocket, mut events: broadcast::Receiver<RealtimeEvent>) {
    debug!("ws viewer connected");
    let (mut outgoing, mut incoming) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!(error = %e, "Failed to encode realtime event");
                            continue;
                        }
                    };
                    if outgoing.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "ws viewer lagged behind, dropping connection");
                    break;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("ws viewer disconnected");
}
