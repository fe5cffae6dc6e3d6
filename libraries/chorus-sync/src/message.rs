//! Frames exchanged on the change channel.

use crate::error::ChannelError;
use chorus_core::Playlist;
use serde::{Deserialize, Serialize};

/// One channel frame: `{"event": <name>, "data": <payload>}`.
///
/// Changes always carry the whole playlist document, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ChannelMessage {
    /// Subscribe to changes of one playlist (sent on every connect)
    Joined {
        /// Bare playlist MBID
        playlist_id: String,
    },

    /// Outbound: the sender just mutated the playlist
    ChangePlaylist(Box<Playlist>),

    /// Inbound: another viewer mutated the playlist
    PlaylistChanged(Box<Playlist>),
}

impl ChannelMessage {
    /// Subscription frame for a playlist
    pub fn joined(playlist_mbid: impl Into<String>) -> Self {
        ChannelMessage::Joined {
            playlist_id: playlist_mbid.into(),
        }
    }

    /// Event name as it appears on the wire
    pub fn event_name(&self) -> &'static str {
        match self {
            ChannelMessage::Joined { .. } => "joined",
            ChannelMessage::ChangePlaylist(_) => "change_playlist",
            ChannelMessage::PlaylistChanged(_) => "playlist_changed",
        }
    }

    /// Encode as a JSON text frame
    pub fn to_text(&self) -> Result<String, ChannelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON text frame
    pub fn from_text(text: &str) -> Result<Self, ChannelError> {
        Ok(serde_json::from_str(text)?)
    }
}
