use crate::model::connection::ConnectionId;
use crate::model::room_key::RoomKey;
use serde::{Deserialize, Serialize};

/// Opaque session description produced by one side's peer connection.
///
/// The relay and the session controller forward it verbatim; only the
/// peer-connection backend ever looks inside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionDescription(pub String);

/// Opaque network-reachability hint. Part of the wire contract for forward
/// compatibility; the non-trickled reference flow never emits one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct IceCandidate(pub String);

/// Messages a client sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom {
        room: RoomKey,
    },
    Offer {
        room: RoomKey,
        sdp: SessionDescription,
    },
    Answer {
        room: RoomKey,
        sdp: SessionDescription,
    },
    IceCandidate {
        room: RoomKey,
        candidate: IceCandidate,
    },
    EndCall {
        room: RoomKey,
    },
}

/// Messages the relay sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once when the transport connects, carrying the relay-assigned id.
    Welcome {
        connection_id: ConnectionId,
    },
    /// Another connection joined the room this client is in.
    UserJoined {
        from: ConnectionId,
    },
    Offer {
        sdp: SessionDescription,
        from: ConnectionId,
    },
    Answer {
        sdp: SessionDescription,
        from: ConnectionId,
    },
    IceCandidate {
        candidate: IceCandidate,
        from: ConnectionId,
    },
    /// The peer hung up, declined, or its transport dropped.
    CallEnded,
}
