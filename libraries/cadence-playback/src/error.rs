//! Error types for the queue engine and its background operations

use cadence_core::CadenceError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Queue position outside the queue
    #[error("Index {index} out of bounds for queue of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Song id not present in the catalog
    #[error("Unknown song: {0}")]
    UnknownSong(i64),

    /// The playback sink rejected a command
    #[error("Sink error: {0}")]
    Sink(String),

    /// Snapshot store failure
    #[error("Storage error: {0}")]
    Storage(#[from] CadenceError),

    /// Background task died before finishing
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PlaybackError {
    /// Create a sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
