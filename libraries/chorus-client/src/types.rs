//! Types for Playlist API requests and responses.

use chorus_core::{Playlist, PlaylistError, Track};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for connecting to the Playlist API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "https://api.listenbrainz.org")
    pub url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a config with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Override both timeouts.
    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }
}

// =============================================================================
// Item Types
// =============================================================================

/// Body of `item/add`: a partial playlist carrying only tracks.
#[derive(Debug, Serialize)]
pub struct AddItemsRequest<'a> {
    pub playlist: TrackList<'a>,
}

#[derive(Debug, Serialize)]
pub struct TrackList<'a> {
    pub track: &'a [Track],
}

/// Body of `item/delete`.
#[derive(Debug, Serialize)]
pub struct DeleteItemRequest<'a> {
    /// Recording expected at `index`
    pub mbid: &'a str,
    pub index: usize,
    pub count: usize,
}

/// Body of `item/move`.
#[derive(Debug, Serialize)]
pub struct MoveItemRequest<'a> {
    pub mbid: &'a str,
    pub from: usize,
    pub to: usize,
    pub count: usize,
}

// =============================================================================
// Playlist Types
// =============================================================================

/// Body of `edit`: the playlist document without its track list.
#[derive(Debug, Serialize)]
pub struct EditPlaylistRequest {
    pub playlist: serde_json::Value,
}

impl EditPlaylistRequest {
    pub(crate) fn from_playlist(playlist: &Playlist) -> Result<Self, PlaylistError> {
        Ok(Self {
            playlist: playlist.metadata_document()?,
        })
    }
}

/// Response of `create` and `copy`.
#[derive(Debug, Deserialize)]
pub struct PlaylistCreatedResponse {
    pub playlist_mbid: String,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    pub error: String,
}

// =============================================================================
// Export Types
// =============================================================================

/// Playlist interchange formats the API can export to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xspf,
    Jspf,
}

impl ExportFormat {
    /// Path segment and file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xspf => "xspf",
            ExportFormat::Jspf => "jspf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Xspf => "application/xspf+xml",
            ExportFormat::Jspf => "application/json",
        }
    }
}

/// A downloaded export, ready to be saved.
#[derive(Debug, Clone)]
pub struct ExportedPlaylist {
    pub format: ExportFormat,
    pub content_type: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}
