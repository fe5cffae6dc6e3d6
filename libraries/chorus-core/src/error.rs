/// Core error types for Chorus playlists
use thiserror::Error;

/// Result type alias using `PlaylistError`
pub type Result<T> = std::result::Result<T, PlaylistError>;

/// Errors raised by the playlist document model
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// The track at `index` does not hold the expected recording
    #[error("Track at index {index} is not {expected} (found {found:?})")]
    Conflict {
        /// Position that was checked
        index: usize,
        /// Recording the caller expected at `index`
        expected: String,
        /// Recording actually found there, if the index was in range
        found: Option<String>,
    },

    /// A move referenced positions outside the track list
    #[error("Cannot move {count} track(s) from {from} to {to} in a playlist of {len}")]
    InvalidMove {
        /// Start of the run to move
        from: usize,
        /// Destination index
        to: usize,
        /// Length of the run
        count: usize,
        /// Number of tracks in the playlist
        len: usize,
    },

    /// Index outside the track list
    #[error("Index {index} out of range for {len} track(s)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of tracks in the playlist
        len: usize,
    },

    /// Malformed playlist or recording identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl PlaylistError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }
}
