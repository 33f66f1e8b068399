use crate::room::{Room, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use huddle_core::RoomKey;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

const ROOM_COMMAND_BUFFER: usize = 100;

/// Owns the map of live rooms and spawns one actor task per room.
///
/// Rooms are created implicitly on first join and remove their own map
/// entry when the last member leaves, so a key can be reused for a later
/// call between the same parties.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomKey, mpsc::Sender<RoomCommand>>>,
    output: Arc<dyn SignalingOutput>,
}

impl RoomRegistry {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            output,
        }
    }

    /// Sends a command to the room.
    ///
    /// Only a join creates a room; every other command targets an existing
    /// one and is dropped when the room is gone, so a stray signal cannot
    /// resurrect a finished call.
    ///
    /// Dispatch can race with the room actor shutting down after its last
    /// member left; in that case the dead entry is dropped and the send is
    /// retried.
    pub async fn dispatch(&self, key: &RoomKey, cmd: RoomCommand) {
        let mut cmd = cmd;
        loop {
            let tx = if matches!(cmd, RoomCommand::Join { .. }) {
                self.sender_for(key)
            } else {
                match self.rooms.get(key).map(|entry| entry.value().clone()) {
                    Some(tx) => tx,
                    None => {
                        debug!("Dropping {:?} for unknown room {}", cmd, key);
                        return;
                    }
                }
            };
            match tx.send(cmd).await {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    self.rooms.remove_if(key, |_, v| v.same_channel(&tx));
                    cmd = returned;
                }
            }
        }
    }

    /// Number of live rooms, for observability.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn sender_for(&self, key: &RoomKey) -> mpsc::Sender<RoomCommand> {
        self.rooms
            .entry(key.clone())
            .or_insert_with(|| {
                info!("Creating room {}", key);
                let (tx, rx) = mpsc::channel(ROOM_COMMAND_BUFFER);
                let room = Room::new(key.clone(), rx, self.output.clone());

                let rooms = self.rooms.clone();
                let key = key.clone();
                let tx_for_cleanup = tx.clone();
                tokio::spawn(async move {
                    room.run().await;
                    // Only remove our own entry; a successor room under the
                    // same key must survive.
                    rooms.remove_if(&key, |_, v| v.same_channel(&tx_for_cleanup));
                });

                tx
            })
            .clone()
    }
}
