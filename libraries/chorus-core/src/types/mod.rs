mod ids;
mod metadata;
mod playlist;
mod track;

pub use ids::{PlaylistId, RecordingId, PLAYLIST_URI_PREFIX, RECORDING_URI_PREFIX};
pub use metadata::MetadataPatch;
pub use playlist::{
    JspfDocument, Playlist, PlaylistExtension, PlaylistExtensions, PLAYLIST_EXTENSION_URI,
};
pub use track::{Track, TrackExtension, TrackExtensions, TRACK_EXTENSION_URI};

/// Case-insensitive username comparison.
pub(crate) fn same_user(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
