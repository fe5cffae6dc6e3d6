/// ID types for playlists and recordings
use crate::error::{PlaylistError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// URI prefix of every playlist identifier
pub const PLAYLIST_URI_PREFIX: &str = "https://listenbrainz.org/playlist/";

/// URI prefix of every track identifier
pub const RECORDING_URI_PREFIX: &str = "https://musicbrainz.org/recording/";

/// Playlist identifier
///
/// Stored in its URI form (`https://listenbrainz.org/playlist/<mbid>`), which is
/// what JSPF documents carry in `identifier`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    /// Wrap an identifier as found in a JSPF document
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the URI identifier from a bare MBID
    pub fn from_mbid(mbid: &str) -> Result<Self> {
        let mbid = Uuid::parse_str(mbid.trim()).map_err(|e| {
            PlaylistError::invalid_identifier(format!("playlist MBID {mbid:?}: {e}"))
        })?;
        Ok(Self(format!("{PLAYLIST_URI_PREFIX}{mbid}")))
    }

    /// The bare MBID, as used in API paths and channel keys
    pub fn mbid(&self) -> &str {
        self.0.strip_prefix(PLAYLIST_URI_PREFIX).unwrap_or(&self.0)
    }

    /// Get the full URI
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recording identifier (a MusicBrainz recording MBID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingId(String);

impl RecordingId {
    /// Create a new recording ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract the recording from a track identifier URI
    pub fn from_track_identifier(identifier: &str) -> Option<Self> {
        identifier
            .strip_prefix(RECORDING_URI_PREFIX)
            .filter(|mbid| !mbid.is_empty())
            .map(|mbid| Self(mbid.trim_end_matches('/').to_string()))
    }

    /// Track identifier URI for this recording
    pub fn to_track_identifier(&self) -> String {
        format!("{RECORDING_URI_PREFIX}{}", self.0)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordingId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
