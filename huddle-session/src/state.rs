use std::fmt;

/// UI-visible state of one call attempt.
///
/// `Initiating` covers both sides waiting for the exchange to begin: the
/// initiator waiting for `user-joined`, the receiver waiting for the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    AcquiringMedia,
    Initiating,
    AwaitingAnswer,
    Ringing,
    Negotiating,
    Connected,
    Ended,
    Failed,
}

impl CallState {
    /// True once the call can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Ended | CallState::Failed)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallState::Idle => "idle",
            CallState::AcquiringMedia => "acquiring media",
            CallState::Initiating => "initiating",
            CallState::AwaitingAnswer => "awaiting answer",
            CallState::Ringing => "ringing",
            CallState::Negotiating => "negotiating",
            CallState::Connected => "connected",
            CallState::Ended => "ended",
            CallState::Failed => "failed",
        };
        write!(f, "{label}")
    }
}
