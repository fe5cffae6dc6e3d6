//! Live editing session for one playlist.
//!
//! A [`PlaylistSession`] holds the viewer's copy of a playlist, checks
//! permissions locally, performs changes through a [`PlaylistGateway`] and
//! tells the other viewers about each successful change over its
//! [`ChangeChannel`]. Changes pushed by others replace the local copy
//! wholesale.

pub mod notice;
mod state;

pub use notice::{Notice, NoticeLevel};
pub use state::{RemoteUpdate, SessionCore, SessionState, Ticket};

use crate::channel::{ChangeChannel, ChannelEvent};
use crate::error::{Result, SessionError};
use crate::transport::ChannelConnector;
use chorus_client::{ExportFormat, ExportedPlaylist, PlaylistGateway};
use chorus_core::{
    EditPolicy, MetadataPatch, Playlist, PlaylistError, PlaylistId, RecordingId, Track,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, MutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of a mutating operation that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Persisted, applied locally and broadcast
    Applied,
    /// Nothing to change; no call was made
    Unchanged,
    /// Persisted, but the session moved to another playlist meanwhile
    Discarded,
}

/// The signed-in user acting in a session.
#[derive(Clone)]
pub struct Viewer {
    pub username: String,
    auth_token: String,
}

impl Viewer {
    pub fn new(username: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            auth_token: auth_token.into(),
        }
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    fn has_token(&self) -> bool {
        !self.auth_token.trim().is_empty()
    }
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("username", &self.username)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Per-session behaviour switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Who may edit tracks and metadata
    #[serde(default)]
    pub edit_policy: EditPolicy,

    /// Run this session's mutations one at a time instead of racing them
    #[serde(default)]
    pub serialize_mutations: bool,

    /// Buffered notices per subscriber before the oldest are dropped
    #[serde(default = "default_notice_capacity")]
    pub notice_capacity: usize,
}

pub(crate) fn default_notice_capacity() -> usize {
    64
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            edit_policy: EditPolicy::default(),
            serialize_mutations: false,
            notice_capacity: default_notice_capacity(),
        }
    }
}

/// One viewer's live view of a playlist.
pub struct PlaylistSession {
    gateway: Arc<dyn PlaylistGateway>,
    channel: ChangeChannel,
    core: RwLock<SessionCore>,
    viewer: Option<Viewer>,
    options: SessionOptions,
    mutations: Mutex<()>,
    notices: broadcast::Sender<Notice>,
}

impl PlaylistSession {
    /// Start a session on an already fetched playlist and join its channel.
    pub async fn open(
        gateway: Arc<dyn PlaylistGateway>,
        connector: Arc<dyn ChannelConnector>,
        playlist: Playlist,
        viewer: Option<Viewer>,
        options: SessionOptions,
    ) -> Result<Self> {
        let channel = ChangeChannel::open(connector, playlist.identifier.clone()).await?;
        let (notices, _) = broadcast::channel(options.notice_capacity.max(1));

        info!(
            playlist_id = %playlist.identifier,
            viewer = ?viewer.as_ref().map(|v| v.username.as_str()),
            policy = ?options.edit_policy,
            "Playlist session opened"
        );

        Ok(Self {
            gateway,
            channel,
            core: RwLock::new(SessionCore::new(playlist, options.edit_policy)),
            viewer,
            options,
            mutations: Mutex::new(()),
            notices,
        })
    }

    /// Fetch a playlist and start a session on it.
    pub async fn load(
        gateway: Arc<dyn PlaylistGateway>,
        connector: Arc<dyn ChannelConnector>,
        playlist_id: &PlaylistId,
        viewer: Option<Viewer>,
        options: SessionOptions,
    ) -> Result<Self> {
        let token = viewer.as_ref().map(Viewer::auth_token);
        let playlist = gateway.get_playlist(token, playlist_id).await?;
        Self::open(gateway, connector, playlist, viewer, options).await
    }

    /// Snapshot of the local playlist
    pub async fn playlist(&self) -> Playlist {
        self.core.read().await.playlist().clone()
    }

    pub async fn state(&self) -> SessionState {
        self.core.read().await.state()
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The session's change channel
    pub fn channel(&self) -> &ChangeChannel {
        &self.channel
    }

    /// Receive every notice published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Whether the viewer may change tracks and metadata
    pub async fn has_right_to_edit(&self) -> bool {
        let viewer = self.viewer.as_ref().map(|v| v.username.as_str());
        self.core.read().await.has_right_to_edit(viewer)
    }

    /// Whether the viewer owns the playlist
    pub async fn is_owner(&self) -> bool {
        match &self.viewer {
            Some(viewer) => self.core.read().await.playlist().is_owner(&viewer.username),
            None => false,
        }
    }

    /// Append a track.
    pub async fn add_track(&self, track: Track) -> Result<MutationOutcome> {
        let result = self.add_track_inner(track).await;
        self.report("add_track", result)
    }

    async fn add_track_inner(&self, track: Track) -> Result<MutationOutcome> {
        let _serial = self.serialize().await;
        let (viewer, ticket, playlist_id) = {
            let mut core = self.core.write().await;
            let viewer = self.gate_edit(&core)?;
            (viewer, core.begin(), core.playlist().identifier.clone())
        };

        let result = self
            .gateway
            .add_track(viewer.auth_token(), &playlist_id, &track)
            .await;

        let mut core = self.core.write().await;
        let current = core.finish(&ticket);
        result?;
        if !current {
            return Ok(discarded("add_track", &playlist_id));
        }

        let notice = Notice::success(
            "Added Track",
            format!("{} by {}", track.title, track.creator),
            notice::ADDED_TRACK,
        );
        core.append(track);
        let snapshot = core.playlist().clone();
        drop(core);

        info!(playlist_id = %playlist_id, tracks = snapshot.track.len(), "Track added");
        self.notify(notice);
        self.publish(&snapshot).await;
        Ok(MutationOutcome::Applied)
    }

    /// Remove the track at `index`, which must hold `recording`.
    ///
    /// A mismatch fails with `Conflict` before anything is sent.
    pub async fn delete_track(
        &self,
        index: usize,
        recording: &RecordingId,
    ) -> Result<MutationOutcome> {
        let result = self.delete_track_inner(index, recording).await;
        self.report("delete_track", result)
    }

    async fn delete_track_inner(
        &self,
        index: usize,
        recording: &RecordingId,
    ) -> Result<MutationOutcome> {
        let _serial = self.serialize().await;
        let (viewer, ticket, playlist_id) = {
            let mut core = self.core.write().await;
            let viewer = self.gate_edit(&core)?;
            core.playlist().check_track_at(index, recording)?;
            (viewer, core.begin(), core.playlist().identifier.clone())
        };

        let result = self
            .gateway
            .delete_track(viewer.auth_token(), &playlist_id, recording, index)
            .await;

        let mut core = self.core.write().await;
        let current = core.finish(&ticket);
        result?;
        if !current {
            return Ok(discarded("delete_track", &playlist_id));
        }

        info!(playlist_id = %playlist_id, recording = %recording, index, "Track deleted");

        // The index was checked against the copy the ticket was issued for
        if !core.same_copy(&ticket) || core.remove(index, recording).is_err() {
            drop(core);
            warn!(playlist_id = %playlist_id, recording = %recording, index, "Playlist changed during delete; reloading");
            return self.reload(viewer, &playlist_id).await;
        }
        let snapshot = core.playlist().clone();
        drop(core);

        self.publish(&snapshot).await;
        Ok(MutationOutcome::Applied)
    }

    /// Move one track from `from` to `to`.
    pub async fn move_track(&self, from: usize, to: usize) -> Result<MutationOutcome> {
        self.move_tracks(from, to, 1).await
    }

    /// Move the run of `count` tracks at `from` so it starts at `to`.
    ///
    /// The local order changes immediately. If the server refuses, the inverse
    /// move restores the previous order before the error is returned.
    pub async fn move_tracks(&self, from: usize, to: usize, count: usize) -> Result<MutationOutcome> {
        let result = self.move_tracks_inner(from, to, count).await;
        self.report("move_track", result)
    }

    async fn move_tracks_inner(
        &self,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<MutationOutcome> {
        let _serial = self.serialize().await;
        let (viewer, ticket, playlist_id, recording) = {
            let mut core = self.core.write().await;
            let viewer = self.gate_edit(&core)?;
            if from == to {
                return Ok(MutationOutcome::Unchanged);
            }
            let playlist = core.playlist();
            let Some(recording) = playlist.track.get(from).map(|t| RecordingId::new(t.key()))
            else {
                return Err(PlaylistError::InvalidMove {
                    from,
                    to,
                    count,
                    len: playlist.track.len(),
                }
                .into());
            };
            let playlist_id = playlist.identifier.clone();
            let ticket = core.move_optimistically(from, to, count)?;
            (viewer, ticket, playlist_id, recording)
        };

        let result = self
            .gateway
            .move_track(viewer.auth_token(), &playlist_id, &recording, from, to, count)
            .await;

        let mut core = self.core.write().await;
        let current = core.finish(&ticket);
        if let Err(err) = result {
            let restored = match core.roll_back_move(&ticket, from, to, count) {
                Ok(restored) => restored,
                Err(e) => {
                    warn!(playlist_id = %playlist_id, error = %e, "Could not roll back failed move");
                    false
                }
            };
            drop(core);

            if restored {
                info!(playlist_id = %playlist_id, from, to, count, "Rolled back failed move");
            } else if current {
                debug!(playlist_id = %playlist_id, "Playlist changed since the move; reloading");
                if let Err(e) = self.reload(viewer, &playlist_id).await {
                    warn!(playlist_id = %playlist_id, error = %e, "Could not reload after failed move");
                }
            }
            return Err(err.into());
        }
        if !current {
            return Ok(discarded("move_track", &playlist_id));
        }

        let snapshot = core.playlist().clone();
        drop(core);

        info!(playlist_id = %playlist_id, recording = %recording, from, to, count, "Tracks moved");
        self.publish(&snapshot).await;
        Ok(MutationOutcome::Applied)
    }

    /// Save title, description, visibility and collaborators.
    ///
    /// The owner is dropped from the collaborators; an edit that changes
    /// nothing makes no call and returns `Unchanged`.
    pub async fn edit_metadata(&self, patch: &MetadataPatch) -> Result<MutationOutcome> {
        let result = self.edit_metadata_inner(patch).await;
        self.report("edit_metadata", result)
    }

    async fn edit_metadata_inner(&self, patch: &MetadataPatch) -> Result<MutationOutcome> {
        let _serial = self.serialize().await;
        let (viewer, ticket, edited, patch) = {
            let mut core = self.core.write().await;
            let viewer = self.gate_edit(&core)?;
            let playlist = core.playlist();
            let patch = patch.normalized_for(&playlist.creator);
            if patch.is_noop_for(playlist) {
                debug!(playlist_id = %playlist.identifier, "Metadata unchanged; skipping save");
                return Ok(MutationOutcome::Unchanged);
            }
            let mut edited = playlist.clone();
            edited.apply_metadata(&patch);
            (viewer, core.begin(), edited, patch)
        };
        let playlist_id = edited.identifier.clone();

        let result = self
            .gateway
            .edit_metadata(viewer.auth_token(), &edited)
            .await;

        let mut core = self.core.write().await;
        let current = core.finish(&ticket);
        result?;
        if !current {
            return Ok(discarded("edit_metadata", &playlist_id));
        }

        core.apply_metadata(&patch);
        let snapshot = core.playlist().clone();
        drop(core);

        info!(playlist_id = %playlist_id, collaborators = snapshot.collaborators().len(), "Playlist metadata saved");
        self.notify(Notice::success(
            "Saved playlist",
            format!("Saved playlist {}", snapshot.title),
            notice::SAVED_PLAYLIST,
        ));
        self.publish(&snapshot).await;
        Ok(MutationOutcome::Applied)
    }

    /// Delete the playlist. Owner only; closes the session on success.
    pub async fn delete_playlist(&self) -> Result<MutationOutcome> {
        let result = self.delete_playlist_inner().await;
        self.report("delete_playlist", result)
    }

    async fn delete_playlist_inner(&self) -> Result<MutationOutcome> {
        let _serial = self.serialize().await;
        let (viewer, ticket, playlist_id, title) = {
            let mut core = self.core.write().await;
            let viewer = self.gate_owner(&core)?;
            let playlist_id = core.playlist().identifier.clone();
            let title = core.playlist().title.clone();
            (viewer, core.begin(), playlist_id, title)
        };

        let result = self
            .gateway
            .delete_playlist(viewer.auth_token(), &playlist_id)
            .await;

        let mut core = self.core.write().await;
        let current = core.finish(&ticket);
        result?;
        if !current {
            return Ok(discarded("delete_playlist", &playlist_id));
        }
        core.close();
        drop(core);

        info!(playlist_id = %playlist_id, "Playlist deleted");
        self.notify(Notice::success(
            "Deleted playlist",
            format!("Deleted playlist {}", title),
            notice::DELETED_PLAYLIST,
        ));
        self.channel.dispose().await;
        Ok(MutationOutcome::Applied)
    }

    /// Copy the playlist into the viewer's account, returning the new id.
    pub async fn copy_playlist(&self) -> Result<PlaylistId> {
        let result = self.copy_playlist_inner().await;
        self.report("copy_playlist", result)
    }

    async fn copy_playlist_inner(&self) -> Result<PlaylistId> {
        let (viewer, ticket, playlist_id, title) = {
            let mut core = self.core.write().await;
            let viewer = self.gate_viewer(&core)?;
            let playlist_id = core.playlist().identifier.clone();
            let title = core.playlist().title.clone();
            (viewer, core.begin(), playlist_id, title)
        };

        let result = self
            .gateway
            .copy_playlist(viewer.auth_token(), &playlist_id)
            .await;
        self.core.write().await.finish(&ticket);
        let copy = result?;

        info!(source = %playlist_id, playlist_id = %copy, "Playlist copied");
        self.notify(Notice::success(
            "Duplicated playlist",
            format!("Duplicated to {}", title),
            notice::COPIED_PLAYLIST,
        ));
        Ok(copy)
    }

    /// Download the playlist, named after its current title.
    pub async fn export(&self, format: ExportFormat) -> Result<ExportedPlaylist> {
        let result = self.export_inner(format).await;
        self.report("export", result)
    }

    async fn export_inner(&self, format: ExportFormat) -> Result<ExportedPlaylist> {
        let (viewer, ticket, playlist_id) = {
            let mut core = self.core.write().await;
            let viewer = self.gate_viewer(&core)?;
            (viewer, core.begin(), core.playlist().identifier.clone())
        };

        let result = self
            .gateway
            .export_to_format(viewer.auth_token(), &playlist_id, format)
            .await;

        let mut core = self.core.write().await;
        core.finish(&ticket);
        let title = core.playlist().title.clone();
        drop(core);

        Ok(result?.with_title(&title))
    }

    /// Replace the local copy with a document pushed by another viewer.
    pub async fn apply_remote_change(&self, playlist: Playlist) -> RemoteUpdate {
        let update = self.core.write().await.apply_remote(playlist);
        match &update {
            RemoteUpdate::Replaced(playlist) => {
                info!(playlist_id = %playlist.identifier, tracks = playlist.track.len(), "Playlist replaced by remote change");
            }
            RemoteUpdate::Ignored { playlist_id } => {
                debug!(playlist_id = %playlist_id, "Ignoring change for another playlist");
            }
            RemoteUpdate::Disconnected { .. } => {}
        }
        update
    }

    /// Wait for the next change from the channel and apply it.
    ///
    /// `None` once the channel is disposed.
    pub async fn next_remote_update(&self) -> Option<RemoteUpdate> {
        match self.channel.next_event().await? {
            ChannelEvent::PlaylistChanged(playlist) => {
                Some(self.apply_remote_change(*playlist).await)
            }
            ChannelEvent::Disconnected { reason } => {
                self.notify(Notice::error(
                    "Live updates paused",
                    reason.clone(),
                    notice::CHANNEL_ERROR,
                ));
                Some(RemoteUpdate::Disconnected { reason })
            }
        }
    }

    /// Apply remote changes in the background until the channel disconnects
    /// or is disposed.
    pub fn spawn_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(update) = session.next_remote_update().await {
                if let RemoteUpdate::Disconnected { reason } = update {
                    debug!(reason = %reason, "Session listener stopping");
                    break;
                }
            }
        })
    }

    /// Rejoin the channel after a disconnect.
    pub async fn reconnect(&self) -> Result<()> {
        let result = self.reconnect_inner().await;
        self.report("reconnect", result)
    }

    async fn reconnect_inner(&self) -> Result<()> {
        if self.core.read().await.is_closed() {
            return Err(SessionError::Closed);
        }
        self.channel.reconnect().await?;
        Ok(())
    }

    /// Show another playlist in this session.
    ///
    /// Calls still in flight for the previous playlist will not be applied.
    pub async fn switch_playlist(&self, playlist: Playlist) -> Result<()> {
        let playlist_id = playlist.identifier.clone();
        {
            let mut core = self.core.write().await;
            let previous = core.playlist().identifier.clone();
            core.switch_to(playlist);
            info!(from = %previous, to = %playlist_id, epoch = core.epoch(), "Switched playlist");
        }
        let result = self.channel.retarget(playlist_id).await.map_err(Into::into);
        self.report("switch_playlist", result)
    }

    /// Fetch another playlist and show it in this session.
    pub async fn navigate(&self, playlist_id: &PlaylistId) -> Result<()> {
        let token = self.viewer.as_ref().map(Viewer::auth_token);
        let fetched = self.gateway.get_playlist(token, playlist_id).await;
        let playlist = self.report("navigate", fetched.map_err(Into::into))?;
        self.switch_playlist(playlist).await
    }

    /// End the session and release its channel.
    pub async fn close(&self) {
        self.core.write().await.close();
        self.channel.dispose().await;
    }

    /// Replace the local copy with the server's and pass it on to the other
    /// viewers, for when a confirmed change no longer fits the local copy.
    async fn reload(&self, viewer: &Viewer, playlist_id: &PlaylistId) -> Result<MutationOutcome> {
        let ticket = self.core.write().await.begin();
        let fetched = self
            .gateway
            .get_playlist(Some(viewer.auth_token()), playlist_id)
            .await;

        let mut core = self.core.write().await;
        let current = core.finish(&ticket);
        let playlist = fetched?;
        if !current {
            return Ok(discarded("reload", playlist_id));
        }
        core.reload(playlist);
        let snapshot = core.playlist().clone();
        drop(core);

        info!(playlist_id = %playlist_id, tracks = snapshot.track.len(), "Playlist reloaded from server");
        self.publish(&snapshot).await;
        Ok(MutationOutcome::Applied)
    }

    fn gate_viewer(&self, core: &SessionCore) -> Result<&Viewer> {
        if core.is_closed() {
            return Err(SessionError::Closed);
        }
        self.viewer
            .as_ref()
            .filter(|v| v.has_token())
            .ok_or(SessionError::Unauthenticated)
    }

    fn gate_edit(&self, core: &SessionCore) -> Result<&Viewer> {
        let viewer = self.gate_viewer(core)?;
        if !core.has_right_to_edit(Some(&viewer.username)) {
            return Err(SessionError::NotAuthorized);
        }
        Ok(viewer)
    }

    fn gate_owner(&self, core: &SessionCore) -> Result<&Viewer> {
        let viewer = self.gate_viewer(core)?;
        if !core.playlist().can_delete(&viewer.username) {
            return Err(SessionError::NotAuthorized);
        }
        Ok(viewer)
    }

    async fn serialize(&self) -> Option<MutexGuard<'_, ()>> {
        if self.options.serialize_mutations {
            Some(self.mutations.lock().await)
        } else {
            None
        }
    }

    async fn publish(&self, playlist: &Playlist) {
        if let Err(e) = self.channel.broadcast(playlist).await {
            warn!(playlist_id = %playlist.identifier, error = %e, "Could not broadcast playlist change");
            self.notify(Notice::error(
                "Live updates unavailable",
                e.to_string(),
                notice::CHANNEL_ERROR,
            ));
        }
    }

    fn notify(&self, notice: Notice) {
        // No subscribers is fine
        let _ = self.notices.send(notice);
    }

    fn report<T>(&self, action: &'static str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!(action, error = %err, "Playlist operation failed");
            self.notify(Notice::from_error(err));
        }
        result
    }
}

fn discarded(action: &'static str, playlist_id: &PlaylistId) -> MutationOutcome {
    warn!(action, playlist_id = %playlist_id, "Completed after switching playlist; not applied");
    MutationOutcome::Discarded
}
