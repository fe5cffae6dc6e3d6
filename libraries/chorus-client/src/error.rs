//! Error types for the Playlist API client.

use thiserror::Error;

/// Errors that can occur when talking to the Playlist API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// No auth token available; nothing was sent
    #[error("Authentication required")]
    Unauthenticated,

    /// Server rejected the token or the caller lacks rights on the playlist
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Playlist or item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The playlist changed under the request (e.g. index no longer matches)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Server is offline, unreachable or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Rate limited by server
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Playlist document error
    #[error(transparent)]
    Playlist(#[from] chorus_core::PlaylistError),

    /// IO error while saving an export
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Classify a transport failure
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::Network(err.to_string())
        } else {
            ApiError::Request(err)
        }
    }

    /// Whether the error came from the network rather than the server's answer
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Request(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
