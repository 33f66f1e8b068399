use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{ConnectionId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Registry of live transport connections and their outbound queues.
#[derive(Clone)]
pub struct SignalingService {
    peers: Arc<DashMap<ConnectionId, mpsc::UnboundedSender<Message>>>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            peers: Arc::new(DashMap::new()),
        }
    }

    pub fn add_peer(&self, conn: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.peers.insert(conn, tx);
    }

    pub fn remove_peer(&self, conn: &ConnectionId) {
        self.peers.remove(conn);
    }

    pub fn send(&self, conn: ConnectionId, msg: &ServerMessage) {
        let Some(peer) = self.peers.get(&conn) else {
            // The recipient is gone. Dropped signals are invisible to the
            // sender; the peer observes this only as a call that never
            // connects.
            debug!("Dropping message for disconnected connection {}", conn);
            return;
        };

        match serde_json::to_string(msg) {
            Ok(json) => {
                if peer.send(Message::Text(json.into())).is_err() {
                    debug!("Outbound queue closed for connection {}", conn);
                }
            }
            Err(e) => error!("Failed to serialize server message: {}", e),
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage) {
        self.send(to, &msg);
    }
}
