mod connection;
mod message;
mod room_key;

pub use connection::ConnectionId;
pub use message::{ClientMessage, IceCandidate, ServerMessage, SessionDescription};
pub use room_key::RoomKey;
