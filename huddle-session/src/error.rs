use thiserror::Error;

/// Why local media could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("media permission denied")]
    PermissionDenied,

    #[error("no capture device available")]
    NoDevice,

    #[error("media backend failure: {0}")]
    Backend(String),
}

/// Attempt-fatal call failures surfaced to the session owner.
///
/// Peer hang-up and transport loss are not errors; they end the call
/// through the normal `Ended` path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("media acquisition failed: {0}")]
    Media(#[from] MediaError),

    #[error("negotiation failed: {0}")]
    Negotiation(String),
}
