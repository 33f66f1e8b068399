use crate::room::room_command::{ForwardPayload, RoomCommand};
use crate::signaling::SignalingOutput;
use huddle_core::{ConnectionId, RoomKey, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One call room, processed as a single actor task.
///
/// Every room-affecting operation (join, forward, disconnect cleanup) goes
/// through the same command channel, so two near-simultaneous joins can
/// never both observe an empty room.
pub struct Room {
    key: RoomKey,
    members: Vec<ConnectionId>,
    saw_join: bool,
    command_rx: mpsc::Receiver<RoomCommand>,
    output: Arc<dyn SignalingOutput>,
}

impl Room {
    pub fn new(
        key: RoomKey,
        command_rx: mpsc::Receiver<RoomCommand>,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            key,
            members: Vec::new(),
            saw_join: false,
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Room {} started", self.key);

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;

            if self.saw_join && self.members.is_empty() {
                break;
            }
        }

        info!("Room {} finished", self.key);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { conn } => {
                self.saw_join = true;

                if self.members.contains(&conn) {
                    debug!("Connection {} already in room {}", conn, self.key);
                    return;
                }

                // Existing occupants learn about the newcomer; the newcomer
                // is told nothing about who was already here.
                for member in &self.members {
                    self.output
                        .deliver(*member, ServerMessage::UserJoined { from: conn })
                        .await;
                }

                info!("Connection {} joined room {}", conn, self.key);
                self.members.push(conn);

                if self.members.len() > 2 {
                    warn!(
                        "Room {} has {} members; the call protocol expects 2",
                        self.key,
                        self.members.len()
                    );
                }
            }

            RoomCommand::Forward { from, payload } => {
                let msg = match payload {
                    ForwardPayload::Offer(sdp) => ServerMessage::Offer { sdp, from },
                    ForwardPayload::Answer(sdp) => ServerMessage::Answer { sdp, from },
                    ForwardPayload::Candidate(candidate) => {
                        ServerMessage::IceCandidate { candidate, from }
                    }
                };

                // No other member means the peer has not joined yet or is
                // already gone. Signaling is best-effort: drop it.
                let mut delivered = false;
                for member in self.members.clone() {
                    if member != from {
                        self.output.deliver(member, msg.clone()).await;
                        delivered = true;
                    }
                }
                if !delivered {
                    debug!("Dropped signal in room {}: no other member", self.key);
                }
            }

            RoomCommand::EndCall { from } => {
                info!("Connection {} ended call in room {}", from, self.key);
                self.remove_and_notify(from).await;
            }

            RoomCommand::Disconnected { conn } => {
                info!("Connection {} dropped from room {}", conn, self.key);
                self.remove_and_notify(conn).await;
            }
        }
    }

    /// Removes a member and tells whoever remains that the call is over.
    /// Hang-up, decline and transport loss all take this same path.
    async fn remove_and_notify(&mut self, conn: ConnectionId) {
        let before = self.members.len();
        self.members.retain(|m| *m != conn);
        if self.members.len() == before {
            return;
        }

        for member in self.members.clone() {
            self.output.deliver(member, ServerMessage::CallEnded).await;
        }
    }
}
