//! Error types for playback.

use stepwise_trace::TraceError;
use thiserror::Error;

/// Errors surfaced by the player handle.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("player task has shut down")]
    Closed,

    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Result type for player calls.
pub type Result<T> = std::result::Result<T, PlaybackError>;
