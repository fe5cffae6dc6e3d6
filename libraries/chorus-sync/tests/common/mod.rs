//! Shared fixtures for session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_client::{ApiError, ExportFormat, ExportedPlaylist, PlaylistGateway};
use chorus_core::{MetadataPatch, Playlist, PlaylistId, RecordingId, Track};
use chorus_sync::{ChannelConnector, PlaylistSession, RelayHub, SessionOptions, Viewer};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const PLAYLIST_MBID: &str = "4a9f5c6e-2b1d-4e8f-9c3a-7d6b5e4f3a21";
pub const OTHER_MBID: &str = "0c5b3a1d-8e7f-4d6c-b5a4-3f2e1d0c9b8a";

/// A request the fake gateway received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    Add { playlist: String, track: String },
    Delete { recording: String, index: usize },
    Move { recording: String, from: usize, to: usize, count: usize },
    Edit(MetadataPatch),
    DeletePlaylist(String),
    Copy(String),
    Export(ExportFormat),
}

/// In-memory gateway that records calls and fails on request.
#[derive(Default)]
pub struct FakeGateway {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<ApiError>>,
    playlists: Mutex<HashMap<String, Playlist>>,
    hold: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_playlist(playlist: Playlist) -> Arc<Self> {
        let gateway = Self::default();
        gateway.set_playlist(playlist);
        Arc::new(gateway)
    }

    /// Replace what `get_playlist` returns for this playlist
    pub fn set_playlist(&self, playlist: Playlist) {
        self.playlists
            .lock()
            .unwrap()
            .insert(playlist.playlist_mbid().to_string(), playlist);
    }

    /// Make the next call fail with `err`
    pub fn fail_next(&self, err: ApiError) {
        self.failures.lock().unwrap().push_back(err);
    }

    /// Block the next call until the returned sender fires
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.hold.lock().unwrap() = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until `n` calls have reached the gateway
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }

    async fn record(&self, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        let held = self.hold.lock().unwrap().take();
        if let Some(release) = held {
            let _ = release.await;
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlaylistGateway for FakeGateway {
    async fn get_playlist(
        &self,
        _auth_token: Option<&str>,
        playlist_id: &PlaylistId,
    ) -> Result<Playlist, ApiError> {
        self.record(Call::Get(playlist_id.mbid().to_string())).await?;
        self.playlists
            .lock()
            .unwrap()
            .get(playlist_id.mbid())
            .cloned()
            .ok_or_else(|| ApiError::NotFound("playlist".into()))
    }

    async fn create_playlist(
        &self,
        _auth_token: &str,
        _playlist: &Playlist,
    ) -> Result<PlaylistId, ApiError> {
        unimplemented!("sessions never create playlists")
    }

    async fn copy_playlist(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
    ) -> Result<PlaylistId, ApiError> {
        if auth_token.is_empty() {
            return Err(ApiError::Unauthenticated);
        }
        self.record(Call::Copy(playlist_id.mbid().to_string())).await?;
        Ok(PlaylistId::from_mbid(OTHER_MBID)?)
    }

    async fn add_track(
        &self,
        _auth_token: &str,
        playlist_id: &PlaylistId,
        track: &Track,
    ) -> Result<(), ApiError> {
        self.record(Call::Add {
            playlist: playlist_id.mbid().to_string(),
            track: track.key(),
        })
        .await
    }

    async fn delete_track(
        &self,
        _auth_token: &str,
        _playlist_id: &PlaylistId,
        recording_id: &RecordingId,
        index: usize,
    ) -> Result<(), ApiError> {
        self.record(Call::Delete {
            recording: recording_id.to_string(),
            index,
        })
        .await
    }

    async fn move_track(
        &self,
        _auth_token: &str,
        _playlist_id: &PlaylistId,
        recording_id: &RecordingId,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<(), ApiError> {
        self.record(Call::Move {
            recording: recording_id.to_string(),
            from,
            to,
            count,
        })
        .await
    }

    async fn edit_metadata(&self, _auth_token: &str, playlist: &Playlist) -> Result<(), ApiError> {
        self.record(Call::Edit(MetadataPatch::from_playlist(playlist)))
            .await
    }

    async fn delete_playlist(
        &self,
        _auth_token: &str,
        playlist_id: &PlaylistId,
    ) -> Result<(), ApiError> {
        self.record(Call::DeletePlaylist(playlist_id.mbid().to_string()))
            .await
    }

    async fn export_to_format(
        &self,
        _auth_token: &str,
        playlist_id: &PlaylistId,
        format: ExportFormat,
    ) -> Result<ExportedPlaylist, ApiError> {
        self.record(Call::Export(format)).await?;
        Ok(ExportedPlaylist {
            format,
            content_type: format.mime_type().to_string(),
            filename: format!("{}.{}", playlist_id.mbid(), format.extension()),
            bytes: b"<playlist/>".to_vec(),
        })
    }
}

/// alice's playlist [T1, T2, T3] with bob as collaborator
pub fn shared_playlist() -> Playlist {
    let mut playlist = Playlist::new(
        PlaylistId::from_mbid(PLAYLIST_MBID).unwrap(),
        "Road Trip",
        "alice",
    );
    for key in ["T1", "T2", "T3"] {
        playlist.append_track(Track::from_recording(key, format!("Song {}", key), "Band"));
    }
    playlist.extension_mut().collaborators = vec!["bob".into()];
    playlist
}

/// `shared_playlist` holding only `keys`, in that order
pub fn with_tracks(keys: &[&str]) -> Playlist {
    let mut playlist = shared_playlist();
    playlist.track = keys
        .iter()
        .map(|key| Track::from_recording(*key, format!("Song {}", key), "Band"))
        .collect();
    playlist
}

pub fn keys(playlist: &Playlist) -> Vec<String> {
    playlist.track.iter().map(Track::key).collect()
}

pub async fn session_for(
    gateway: &Arc<FakeGateway>,
    hub: &RelayHub,
    playlist: Playlist,
    viewer: Option<Viewer>,
    options: SessionOptions,
) -> PlaylistSession {
    let connector: Arc<dyn ChannelConnector> = Arc::new(hub.clone());
    PlaylistSession::open(gateway.clone(), connector, playlist, viewer, options)
        .await
        .unwrap()
}

pub fn alice() -> Option<Viewer> {
    Some(Viewer::new("alice", "alice-token"))
}

pub fn bob() -> Option<Viewer> {
    Some(Viewer::new("bob", "bob-token"))
}

pub fn mallory() -> Option<Viewer> {
    Some(Viewer::new("mallory", "mallory-token"))
}
