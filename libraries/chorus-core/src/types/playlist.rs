/// JSPF playlist document
use crate::error::{PlaylistError, Result};
use crate::permission::EditPolicy;
use crate::types::{same_user, MetadataPatch, PlaylistId, RecordingId, Track};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the MusicBrainz playlist extension block
pub const PLAYLIST_EXTENSION_URI: &str = "https://musicbrainz.org/doc/jspf#playlist";

/// Top-level JSPF document (`{"playlist": {...}}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JspfDocument {
    /// The wrapped playlist
    pub playlist: Playlist,
}

impl JspfDocument {
    /// Parse a JSPF document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A collaborative playlist
///
/// Track order is playback and display order; every mutation here preserves it
/// except where the operation explicitly reorders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    /// Immutable playlist URI
    pub identifier: PlaylistId,

    /// Playlist title
    pub title: String,

    /// Owner username
    pub creator: String,

    /// Free-text description, may contain markup
    #[serde(default)]
    pub annotation: String,

    /// Creation timestamp
    pub date: DateTime<Utc>,

    /// Ordered tracks
    #[serde(default)]
    pub track: Vec<Track>,

    /// Extension map
    #[serde(default)]
    pub extension: PlaylistExtensions,
}

/// Extension map of a JSPF playlist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistExtensions {
    /// MusicBrainz-specific fields
    #[serde(
        rename = "https://musicbrainz.org/doc/jspf#playlist",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub musicbrainz: Option<PlaylistExtension>,
}

/// MusicBrainz fields attached to a playlist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistExtension {
    /// Visible to everyone
    #[serde(default)]
    pub public: bool,

    /// Users allowed to edit besides the owner
    #[serde(default)]
    pub collaborators: Vec<String>,

    /// Last server-side modification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,

    /// Source playlist URI when this one is a copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copied_from: Option<String>,

    /// Set when the source of a copy has since been deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copied_from_deleted: Option<bool>,

    /// User a generated playlist was made for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_for: Option<String>,
}

impl Playlist {
    /// Create an empty private playlist owned by `creator`
    pub fn new(identifier: PlaylistId, title: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            identifier,
            title: title.into(),
            creator: creator.into(),
            annotation: String::new(),
            date: Utc::now(),
            track: Vec::new(),
            extension: PlaylistExtensions {
                musicbrainz: Some(PlaylistExtension::default()),
            },
        }
    }

    /// Bare MBID of this playlist
    pub fn playlist_mbid(&self) -> &str {
        self.identifier.mbid()
    }

    /// MusicBrainz extension block, if present
    pub fn extension(&self) -> Option<&PlaylistExtension> {
        self.extension.musicbrainz.as_ref()
    }

    /// MusicBrainz extension block, created on first access
    pub fn extension_mut(&mut self) -> &mut PlaylistExtension {
        self.extension
            .musicbrainz
            .get_or_insert_with(PlaylistExtension::default)
    }

    /// Listed collaborators
    pub fn collaborators(&self) -> &[String] {
        self.extension()
            .map(|ext| ext.collaborators.as_slice())
            .unwrap_or(&[])
    }

    /// Public flag
    pub fn is_public(&self) -> bool {
        self.extension().is_some_and(|ext| ext.public)
    }

    /// Last modification, falling back to the creation date
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.extension()
            .and_then(|ext| ext.last_modified_at)
            .unwrap_or(self.date)
    }

    /// Whether `username` owns this playlist
    pub fn is_owner(&self, username: &str) -> bool {
        same_user(&self.creator, username)
    }

    /// Whether `username` is a listed collaborator
    pub fn is_collaborator(&self, username: &str) -> bool {
        self.collaborators().iter().any(|c| same_user(c, username))
    }

    /// Whether `username` may change tracks or metadata under `policy`
    pub fn can_edit(&self, username: Option<&str>, policy: EditPolicy) -> bool {
        policy.allows(self, username)
    }

    /// Only the owner may delete a playlist
    pub fn can_delete(&self, username: &str) -> bool {
        self.is_owner(username)
    }

    /// Append one track at the end
    pub fn append_track(&mut self, track: Track) {
        self.track.push(track);
    }

    /// Remove the track at `index`, which must currently hold `recording`
    ///
    /// The index is a consistency check: if it is out of range or points at a
    /// different recording the playlist is left untouched.
    pub fn remove_track_at(&mut self, index: usize, recording: &RecordingId) -> Result<Track> {
        self.check_track_at(index, recording)?;
        Ok(self.track.remove(index))
    }

    /// Verify `index` holds `recording` without mutating
    pub fn check_track_at(&self, index: usize, recording: &RecordingId) -> Result<()> {
        match self.track.get(index) {
            Some(track) if track.is_recording(recording) => Ok(()),
            found => Err(PlaylistError::Conflict {
                index,
                expected: recording.to_string(),
                found: found.map(Track::key),
            }),
        }
    }

    /// Relocate the run `[from, from + count)` so that it starts at `to`
    ///
    /// `to` is an index into the resulting list. `move_tracks(to, from, count)`
    /// undoes the move.
    pub fn move_tracks(&mut self, from: usize, to: usize, count: usize) -> Result<()> {
        let len = self.track.len();
        let in_range = |start: usize| start.checked_add(count).is_some_and(|end| end <= len);
        if count == 0 || !in_range(from) || !in_range(to) {
            return Err(PlaylistError::InvalidMove {
                from,
                to,
                count,
                len,
            });
        }
        if from == to {
            return Ok(());
        }

        let run: Vec<Track> = self.track.drain(from..from + count).collect();
        self.track.splice(to..to, run);
        Ok(())
    }

    /// Exchange two positions
    pub fn swap_positions(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.track.len();
        for index in [a, b] {
            if index >= len {
                return Err(PlaylistError::IndexOutOfRange { index, len });
            }
        }
        self.track.swap(a, b);
        Ok(())
    }

    /// Apply an edited title/description/visibility/collaborator set
    ///
    /// The owner is stripped from the collaborators and tracks are untouched.
    /// Other extension fields are preserved.
    pub fn apply_metadata(&mut self, patch: &MetadataPatch) {
        let patch = patch.normalized_for(&self.creator);
        self.title = patch.title;
        self.annotation = patch.annotation;
        let ext = self.extension_mut();
        ext.public = patch.public;
        ext.collaborators = patch.collaborators;
    }

    /// JSON of this playlist without its track list, as sent on metadata edits
    pub fn metadata_document(&self) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("track");
        }
        Ok(value)
    }
}
