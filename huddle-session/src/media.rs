use crate::error::MediaError;
use async_trait::async_trait;
use std::sync::Arc;

/// Capture capability of the hosting environment
/// (`navigator.mediaDevices` in a browser).
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Requests local audio+video capture. May suspend indefinitely while
    /// the user decides on a permission prompt.
    async fn acquire(&self) -> Result<Arc<dyn LocalMedia>, MediaError>;
}

/// Handle to the acquired local tracks, exclusively owned by one session.
pub trait LocalMedia: Send + Sync {
    /// Stops every local track. Must be safe to call more than once.
    fn stop(&self);
}
