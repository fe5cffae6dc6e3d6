//! The playlist operations a session needs from the API.

use crate::error::Result;
use crate::types::{ExportFormat, ExportedPlaylist};
use async_trait::async_trait;
use chorus_core::{Playlist, PlaylistId, RecordingId, Track};

/// Remote playlist operations.
///
/// Every mutating call takes the viewer's auth token and fails with
/// `ApiError::Unauthenticated`, without touching the network, when the token
/// is empty. Callers must not assume success until the call resolves.
#[async_trait]
pub trait PlaylistGateway: Send + Sync {
    /// Fetch a full playlist document. Private playlists need a token.
    async fn get_playlist(
        &self,
        auth_token: Option<&str>,
        playlist_id: &PlaylistId,
    ) -> Result<Playlist>;

    /// Create a playlist, returning its new identifier.
    async fn create_playlist(&self, auth_token: &str, playlist: &Playlist) -> Result<PlaylistId>;

    /// Copy a playlist into the viewer's account.
    async fn copy_playlist(&self, auth_token: &str, playlist_id: &PlaylistId)
        -> Result<PlaylistId>;

    /// Append one track.
    async fn add_track(&self, auth_token: &str, playlist_id: &PlaylistId, track: &Track)
        -> Result<()>;

    /// Remove the track at `index`, which the server verifies holds `recording_id`.
    async fn delete_track(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
        recording_id: &RecordingId,
        index: usize,
    ) -> Result<()>;

    /// Relocate the run of `count` tracks starting at `from` to `to`.
    async fn move_track(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
        recording_id: &RecordingId,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<()>;

    /// Save the title, description, visibility and collaborators of
    /// `playlist`, which already carries the edit. Tracks are not sent.
    async fn edit_metadata(&self, auth_token: &str, playlist: &Playlist) -> Result<()>;

    /// Delete the playlist.
    async fn delete_playlist(&self, auth_token: &str, playlist_id: &PlaylistId) -> Result<()>;

    /// Download the playlist in an interchange format.
    async fn export_to_format(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
        format: ExportFormat,
    ) -> Result<ExportedPlaylist>;
}
