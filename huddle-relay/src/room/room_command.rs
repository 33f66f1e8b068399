use huddle_core::{ConnectionId, IceCandidate, SessionDescription};

/// Payload of a peer-to-peer signal the room forwards verbatim.
#[derive(Debug, Clone)]
pub enum ForwardPayload {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Candidate(IceCandidate),
}

/// Commands arriving at a room actor from the transport layer.
#[derive(Debug)]
pub enum RoomCommand {
    /// A connection joined the room.
    Join { conn: ConnectionId },

    /// A connection-setup signal to fan out to the other member.
    Forward {
        from: ConnectionId,
        payload: ForwardPayload,
    },

    /// Explicit hang-up or decline: notify the peer, drop the sender.
    EndCall { from: ConnectionId },

    /// Transport dropped without an end-call. The room must still notify
    /// any remaining member, otherwise that peer hangs forever.
    Disconnected { conn: ConnectionId },
}
