use crate::error::CallError;
use crate::media::LocalMedia;
use async_trait::async_trait;
use huddle_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Which side of the call this session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallRole {
    /// Produces the offer once the peer joins the room.
    Initiator,
    /// Waits for the offer, rings, and produces the answer on accept.
    Receiver,
}

/// Asynchronous events surfaced by a peer-connection backend.
#[derive(Debug)]
pub enum PeerEvent {
    /// Inbound remote media arrived: the call is live.
    RemoteStream,
    /// The backend produced a trickled candidate. The bundled reference
    /// flow never emits these, but the contract carries them.
    CandidateReady(IceCandidate),
    /// Negotiation or transport failure inside the backend.
    Failed(String),
}

/// Factory for peer connections bound to a local media stream
/// (`RTCPeerConnection` construction in a browser).
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        role: CallRole,
        media: Arc<dyn LocalMedia>,
    ) -> Result<Box<dyn PeerConnection>, CallError>;
}

/// One peer connection, exclusively owned by its session.
#[async_trait]
pub trait PeerConnection: Send {
    /// The bundled local description: the offer on the initiator side, the
    /// answer on the receiver side once the remote offer is applied.
    async fn local_description(&mut self) -> Result<SessionDescription, CallError>;

    async fn set_remote_description(&mut self, desc: SessionDescription) -> Result<(), CallError>;

    async fn add_remote_candidate(&mut self, candidate: IceCandidate) -> Result<(), CallError>;

    /// Takes the backend event stream. Yields at most one `RemoteStream`
    /// per connection.
    fn take_events(&mut self) -> mpsc::UnboundedReceiver<PeerEvent>;

    /// Closes the connection. Must be safe to call more than once.
    async fn close(&mut self);
}
