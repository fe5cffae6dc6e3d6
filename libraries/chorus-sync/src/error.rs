//! Error types for live playlist sessions.

use chorus_client::ApiError;
use chorus_core::PlaylistError;
use thiserror::Error;

/// Errors raised by a change channel or its transports.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The channel was disposed or its connection is gone
    #[error("Channel is closed")]
    Closed,

    /// Could not reach the push endpoint
    #[error("Failed to connect: {0}")]
    Connect(String),

    /// The underlying connection failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// A message arrived out of protocol (e.g. a change before `joined`)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid push endpoint URL
    #[error("Invalid channel URL: {0}")]
    InvalidUrl(String),

    /// Frame could not be encoded or decoded
    #[error("Malformed message: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChannelError {
    /// Whether the connection survives this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ChannelError::Serialization(_))
    }
}

/// Errors surfaced by a playlist session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No viewer or auth token
    #[error("You must be logged in for this operation")]
    Unauthenticated,

    /// The local permission check failed
    #[error("You are not authorized to modify this playlist")]
    NotAuthorized,

    /// The server rejected the viewer's rights
    #[error("You are not authorized to modify this playlist: {0}")]
    Unauthorized(String),

    /// The playlist changed under the request
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Playlist or item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// Any other API failure
    #[error(transparent)]
    Api(ApiError),

    /// Invalid local operation (bad move range, index out of bounds)
    #[error(transparent)]
    Playlist(PlaylistError),

    /// Change channel failure
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The session was closed or its playlist deleted
    #[error("Session is closed")]
    Closed,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthenticated => SessionError::Unauthenticated,
            ApiError::Unauthorized(msg) => SessionError::Unauthorized(msg),
            ApiError::Conflict(msg) => SessionError::Conflict(msg),
            ApiError::NotFound(msg) => SessionError::NotFound(msg),
            ApiError::Network(msg) => SessionError::Network(msg),
            ApiError::Playlist(err) => err.into(),
            other => SessionError::Api(other),
        }
    }
}

impl From<PlaylistError> for SessionError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::Conflict { .. } => SessionError::Conflict(err.to_string()),
            other => SessionError::Playlist(other),
        }
    }
}

impl SessionError {
    /// Whether this is an authentication or permission failure
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            SessionError::Unauthenticated
                | SessionError::NotAuthorized
                | SessionError::Unauthorized(_)
        )
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
