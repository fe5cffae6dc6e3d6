/// JSPF track type
use crate::types::RecordingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the MusicBrainz track extension block
pub const TRACK_EXTENSION_URI: &str = "https://musicbrainz.org/doc/jspf#track";

/// A playlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Recording URI (`https://musicbrainz.org/recording/<mbid>`)
    pub identifier: String,

    /// Track title
    #[serde(default)]
    pub title: String,

    /// Artist display name
    #[serde(default)]
    pub creator: String,

    /// MusicBrainz extension block
    #[serde(default, skip_serializing_if = "TrackExtensions::is_empty")]
    pub extension: TrackExtensions,
}

/// Extension map of a JSPF track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackExtensions {
    /// MusicBrainz-specific fields
    #[serde(
        rename = "https://musicbrainz.org/doc/jspf#track",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub musicbrainz: Option<TrackExtension>,
}

impl TrackExtensions {
    fn is_empty(&self) -> bool {
        self.musicbrainz.is_none()
    }
}

/// MusicBrainz fields attached to a track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackExtension {
    /// User who added the track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,

    /// When the track was added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Track {
    /// Build a track from recording search metadata
    pub fn from_recording(
        recording_mbid: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        let recording = RecordingId::new(recording_mbid);
        Self {
            identifier: recording.to_track_identifier(),
            title: title.into(),
            creator: artist.into(),
            extension: TrackExtensions::default(),
        }
    }

    /// Linked recording, derived from the identifier
    pub fn recording_id(&self) -> Option<RecordingId> {
        RecordingId::from_track_identifier(&self.identifier)
    }

    /// Stable list key: the recording MBID, or the raw identifier when unlinked
    pub fn key(&self) -> String {
        self.recording_id()
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| self.identifier.clone())
    }

    /// Whether this track is the given recording
    pub fn is_recording(&self, recording: &RecordingId) -> bool {
        self.key() == recording.as_str()
    }
}
