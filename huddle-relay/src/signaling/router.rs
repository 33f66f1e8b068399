use crate::room::{ForwardPayload, RoomCommand, RoomRegistry};
use huddle_core::{ClientMessage, ConnectionId, RoomKey};
use tracing::debug;

/// Routes one inbound client message to the room registry.
///
/// `joined` is the connection's current room binding, owned by the
/// transport task. The protocol allows one room per connection; joining a
/// second room leaves the first, and end-call clears the binding.
///
/// Transport-independent so tests can drive the relay without a socket.
pub async fn route_client_message(
    registry: &RoomRegistry,
    conn: ConnectionId,
    joined: &mut Option<RoomKey>,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::JoinRoom { room } => {
            if joined.as_ref() == Some(&room) {
                debug!("Connection {} re-joined room {}", conn, room);
                return;
            }
            if let Some(previous) = joined.take() {
                registry
                    .dispatch(&previous, RoomCommand::Disconnected { conn })
                    .await;
            }
            registry.dispatch(&room, RoomCommand::Join { conn }).await;
            *joined = Some(room);
        }

        ClientMessage::Offer { room, sdp } => {
            registry
                .dispatch(
                    &room,
                    RoomCommand::Forward {
                        from: conn,
                        payload: ForwardPayload::Offer(sdp),
                    },
                )
                .await;
        }

        ClientMessage::Answer { room, sdp } => {
            registry
                .dispatch(
                    &room,
                    RoomCommand::Forward {
                        from: conn,
                        payload: ForwardPayload::Answer(sdp),
                    },
                )
                .await;
        }

        ClientMessage::IceCandidate { room, candidate } => {
            registry
                .dispatch(
                    &room,
                    RoomCommand::Forward {
                        from: conn,
                        payload: ForwardPayload::Candidate(candidate),
                    },
                )
                .await;
        }

        ClientMessage::EndCall { room } => {
            registry
                .dispatch(&room, RoomCommand::EndCall { from: conn })
                .await;
            if joined.as_ref() == Some(&room) {
                *joined = None;
            }
        }
    }
}

/// Transport-level disconnect: leave any joined room so the remaining peer
/// gets a synthetic call-ended instead of hanging on a dead connection.
pub async fn route_disconnect(
    registry: &RoomRegistry,
    conn: ConnectionId,
    joined: &mut Option<RoomKey>,
) {
    if let Some(room) = joined.take() {
        registry
            .dispatch(&room, RoomCommand::Disconnected { conn })
            .await;
    }
}
