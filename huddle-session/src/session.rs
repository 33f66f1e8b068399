use crate::error::CallError;
use crate::media::{LocalMedia, MediaDevices};
use crate::peer::{CallRole, PeerConnection, PeerConnector, PeerEvent};
use crate::state::CallState;
use huddle_core::{ClientMessage, RoomKey, ServerMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Parameters of one call attempt, supplied by the owning UI.
#[derive(Debug, Clone)]
pub struct CallConfig {
    pub room: RoomKey,
    pub role: CallRole,
    /// Display name of this side, for UI labelling only.
    pub self_name: String,
    /// Display name of the peer, for UI labelling only.
    pub peer_name: String,
}

/// Commands from the UI that owns the call.
#[derive(Debug)]
enum CallControl {
    Accept,
    Decline,
    HangUp,
}

/// UI-facing handle to a running session.
///
/// Dropping the handle counts as a hang-up: the session tears down and
/// notifies the peer even if the user just navigated away.
pub struct CallHandle {
    control_tx: mpsc::UnboundedSender<CallControl>,
    state_rx: watch::Receiver<CallState>,
    self_name: String,
    peer_name: String,
}

impl CallHandle {
    pub fn accept(&self) {
        let _ = self.control_tx.send(CallControl::Accept);
    }

    pub fn decline(&self) {
        let _ = self.control_tx.send(CallControl::Decline);
    }

    pub fn hang_up(&self) {
        let _ = self.control_tx.send(CallControl::HangUp);
    }

    pub fn state(&self) -> CallState {
        *self.state_rx.borrow()
    }

    /// Waits until the session reaches `target`. Returns false if the
    /// session finished without ever reaching it.
    pub async fn wait_for(&mut self, target: CallState) -> bool {
        self.state_rx.wait_for(|s| *s == target).await.is_ok()
    }

    pub fn self_name(&self) -> &str {
        &self.self_name
    }

    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }
}

/// State machine for one call attempt.
///
/// Owns the local media stream and the peer connection exclusively. Driven
/// by a single event loop, so every transition is a function of the current
/// state and one event; nothing here is shared across concurrent calls.
pub struct CallSession {
    cfg: CallConfig,
    media: Arc<dyn MediaDevices>,
    connector: Arc<dyn PeerConnector>,
    signal_tx: mpsc::UnboundedSender<ClientMessage>,
    signal_rx: mpsc::UnboundedReceiver<ServerMessage>,
    control_rx: mpsc::UnboundedReceiver<CallControl>,
    state_tx: watch::Sender<CallState>,

    local_media: Option<Arc<dyn LocalMedia>>,
    peer: Option<Box<dyn PeerConnection>>,
    peer_events: Option<mpsc::UnboundedReceiver<PeerEvent>>,
    pending_offer: Option<huddle_core::SessionDescription>,
    offer_sent: bool,
    joined: bool,
    remote_ended: bool,
    torn_down: bool,
}

impl CallSession {
    /// Builds a session wired to the given signaling channel pair:
    /// `signal_tx` carries messages toward the relay, `signal_rx` delivers
    /// messages the relay fanned out to this connection.
    pub fn new(
        cfg: CallConfig,
        media: Arc<dyn MediaDevices>,
        connector: Arc<dyn PeerConnector>,
        signal_tx: mpsc::UnboundedSender<ClientMessage>,
        signal_rx: mpsc::UnboundedReceiver<ServerMessage>,
    ) -> (Self, CallHandle) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(CallState::Idle);

        let handle = CallHandle {
            control_tx,
            state_rx,
            self_name: cfg.self_name.clone(),
            peer_name: cfg.peer_name.clone(),
        };

        let session = Self {
            cfg,
            media,
            connector,
            signal_tx,
            signal_rx,
            control_rx,
            state_tx,
            local_media: None,
            peer: None,
            peer_events: None,
            pending_offer: None,
            offer_sent: false,
            joined: false,
            remote_ended: false,
            torn_down: false,
        };

        (session, handle)
    }

    /// Runs the call to completion.
    ///
    /// Returns `Err` only for attempt-fatal failures (media acquisition,
    /// negotiation); every other exit (hang-up, decline, peer hang-up,
    /// relay loss) is a normal `Ended` call. Teardown runs on every path.
    pub async fn run(mut self) -> Result<(), CallError> {
        let result = self.drive().await;
        self.teardown().await;

        match result {
            Ok(()) => {
                self.set_state(CallState::Ended);
                Ok(())
            }
            Err(e) => {
                warn!("Call in room {} failed: {}", self.cfg.room, e);
                self.set_state(CallState::Failed);
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<(), CallError> {
        self.set_state(CallState::AcquiringMedia);

        // The one indefinitely-suspending step: permission prompt and
        // device negotiation. Failure abandons the attempt before the
        // relay ever sees a join.
        let media = self.media.acquire().await?;
        self.local_media = Some(media);

        self.send_signal(ClientMessage::JoinRoom {
            room: self.cfg.room.clone(),
        });
        self.joined = true;
        self.set_state(CallState::Initiating);

        loop {
            tokio::select! {
                ctl = self.control_rx.recv() => match ctl {
                    Some(CallControl::Accept) => self.handle_accept().await?,
                    // Decline outside Ringing and a dropped handle are
                    // both just hang-ups.
                    Some(CallControl::Decline)
                    | Some(CallControl::HangUp)
                    | None => return Ok(()),
                },

                sig = self.signal_rx.recv() => match sig {
                    Some(msg) => {
                        if self.handle_signal(msg).await? {
                            return Ok(());
                        }
                    }
                    // Relay link gone. Best-effort signaling: the call
                    // simply ends.
                    None => return Ok(()),
                },

                evt = Self::next_peer_event(&mut self.peer_events) => match evt {
                    Some(event) => {
                        if self.handle_peer_event(event)? {
                            return Ok(());
                        }
                    }
                    None => self.peer_events = None,
                },
            }
        }
    }

    async fn handle_accept(&mut self) -> Result<(), CallError> {
        if self.state() != CallState::Ringing {
            debug!("Accept ignored outside Ringing");
            return Ok(());
        }
        let Some(offer) = self.pending_offer.take() else {
            return Ok(());
        };
        let Some(media) = self.local_media.clone() else {
            return Ok(());
        };

        let mut peer = self.connector.connect(CallRole::Receiver, media).await?;
        peer.set_remote_description(offer).await?;
        let answer = peer.local_description().await?;

        self.peer_events = Some(peer.take_events());
        self.peer = Some(peer);

        self.send_signal(ClientMessage::Answer {
            room: self.cfg.room.clone(),
            sdp: answer,
        });
        self.set_state(CallState::Negotiating);
        Ok(())
    }

    /// Returns `Ok(true)` when the call is over.
    async fn handle_signal(&mut self, msg: ServerMessage) -> Result<bool, CallError> {
        match msg {
            ServerMessage::Welcome { connection_id } => {
                debug!("Relay assigned connection id {}", connection_id);
            }

            ServerMessage::UserJoined { from } => {
                // Only the initiator reacts, and only once: a duplicate
                // join (reconnect race) must not restart negotiation.
                if self.cfg.role != CallRole::Initiator {
                    return Ok(false);
                }
                if self.offer_sent || self.peer.is_some() {
                    debug!("Duplicate user-joined from {} ignored", from);
                    return Ok(false);
                }
                let Some(media) = self.local_media.clone() else {
                    return Ok(false);
                };

                info!("Peer {} joined room {}; sending offer", from, self.cfg.room);
                let mut peer = self.connector.connect(CallRole::Initiator, media).await?;
                let offer = peer.local_description().await?;

                self.peer_events = Some(peer.take_events());
                self.peer = Some(peer);
                self.offer_sent = true;

                self.send_signal(ClientMessage::Offer {
                    room: self.cfg.room.clone(),
                    sdp: offer,
                });
                self.set_state(CallState::AwaitingAnswer);
            }

            ServerMessage::Offer { sdp, from } => {
                if self.cfg.role != CallRole::Receiver
                    || self.state() != CallState::Initiating
                {
                    // A second offer while ringing, negotiating or mid-call
                    // must not restart the exchange.
                    debug!("Offer from {} ignored in state {}", from, self.state());
                    return Ok(false);
                }
                self.pending_offer = Some(sdp);
                self.set_state(CallState::Ringing);
            }

            ServerMessage::Answer { sdp, from } => {
                // An answer before our offer (or a repeat) is inert.
                if !self.offer_sent || self.state() != CallState::AwaitingAnswer {
                    debug!("Answer from {} ignored in state {}", from, self.state());
                    return Ok(false);
                }
                let Some(peer) = self.peer.as_mut() else {
                    return Ok(false);
                };
                peer.set_remote_description(sdp).await?;
                self.set_state(CallState::Negotiating);
            }

            ServerMessage::IceCandidate { candidate, from } => {
                let Some(peer) = self.peer.as_mut() else {
                    debug!("Candidate from {} before peer connection; dropped", from);
                    return Ok(false);
                };
                if let Err(e) = peer.add_remote_candidate(candidate).await {
                    warn!("Failed to apply candidate from {}: {}", from, e);
                }
            }

            ServerMessage::CallEnded => {
                // End-call always wins, whatever was in flight.
                info!("Peer ended call in room {}", self.cfg.room);
                self.remote_ended = true;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Returns `Ok(true)` when the call is over.
    fn handle_peer_event(&mut self, event: PeerEvent) -> Result<bool, CallError> {
        match event {
            PeerEvent::RemoteStream => {
                // Exactly one transition to Connected per call.
                if self.state() == CallState::Negotiating {
                    info!("Remote stream arrived in room {}", self.cfg.room);
                    self.set_state(CallState::Connected);
                } else {
                    debug!("Remote stream ignored in state {}", self.state());
                }
            }

            PeerEvent::CandidateReady(candidate) => {
                self.send_signal(ClientMessage::IceCandidate {
                    room: self.cfg.room.clone(),
                    candidate,
                });
            }

            PeerEvent::Failed(reason) => {
                if self.state() == CallState::Connected {
                    // Mid-call loss is the end-call path, not an error.
                    return Ok(true);
                }
                return Err(CallError::Negotiation(reason));
            }
        }

        Ok(false)
    }

    async fn next_peer_event(
        events: &mut Option<mpsc::UnboundedReceiver<PeerEvent>>,
    ) -> Option<PeerEvent> {
        match events {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Releases everything the session owns. Safe to invoke repeatedly;
    /// later calls are no-ops.
    pub async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(media) = &self.local_media {
            media.stop();
        }
        if let Some(mut peer) = self.peer.take() {
            peer.close().await;
        }
        // Tell the peer we are gone, unless it already told us (or we
        // never made it into the room).
        if self.joined && !self.remote_ended {
            self.send_signal(ClientMessage::EndCall {
                room: self.cfg.room.clone(),
            });
        }
    }

    fn state(&self) -> CallState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: CallState) {
        debug!("Call in room {}: {} -> {}", self.cfg.room, self.state(), state);
        self.state_tx.send_replace(state);
    }

    fn send_signal(&self, msg: ClientMessage) {
        // Fire-and-forget by design; a closed relay link surfaces as the
        // call never progressing, not as an error here.
        let _ = self.signal_tx.send(msg);
    }
}
