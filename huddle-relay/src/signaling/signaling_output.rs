use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerMessage};

/// Delivery side of the relay, implemented by the transport layer
/// (the WebSocket server in production, a capture channel in tests).
///
/// Delivery is best-effort: implementations must swallow failures for
/// absent or closed connections rather than surface them to the room.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage);
}
