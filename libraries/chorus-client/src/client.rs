//! reqwest implementation of the playlist gateway.

use crate::error::{ApiError, Result};
use crate::gateway::PlaylistGateway;
use crate::types::{
    AddItemsRequest, ApiErrorBody, ClientConfig, DeleteItemRequest, EditPlaylistRequest,
    ExportFormat, ExportedPlaylist, MoveItemRequest, PlaylistCreatedResponse, TrackList,
};
use async_trait::async_trait;
use chorus_core::{JspfDocument, MetadataPatch, Playlist, PlaylistId, RecordingId, Track};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};

/// Client for the Playlist API.
///
/// # Example
///
/// ```ignore
/// use chorus_client::{ClientConfig, PlaylistApiClient, PlaylistGateway};
///
/// let client = PlaylistApiClient::new(ClientConfig::new("https://api.listenbrainz.org"))?;
/// let playlist = client.get_playlist(Some(token), &playlist_id).await?;
/// client.move_track(token, &playlist.identifier, &recording, 2, 0, 1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PlaylistApiClient {
    http: Client,
    base_url: String,
}

impl PlaylistApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Validate URL
        if config.url.trim().is_empty() {
            return Err(ApiError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("Chorus/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self { http, base_url })
    }

    /// Get the normalized API URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/1/playlist{}", self.base_url, path)
    }

    /// Send a request and translate the response status.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(ApiError::from_transport)?;
        check_status(response, what).await
    }
}

fn require_token(auth_token: &str) -> Result<&str> {
    if auth_token.trim().is_empty() {
        return Err(ApiError::Unauthenticated);
    }
    Ok(auth_token)
}

/// Map non-success statuses onto `ApiError`.
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let message = error_message(response).await;
    warn!(status = %status, what = %what, error = %message, "Playlist API request failed");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(if message.is_empty() {
            what.to_string()
        } else {
            message
        }),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(1),
        },
        _ => ApiError::ServerError {
            status: status.as_u16(),
            message,
        },
    })
}

/// Pull the human-readable message out of an error body.
async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text)
}

#[async_trait]
impl PlaylistGateway for PlaylistApiClient {
    async fn get_playlist(
        &self,
        auth_token: Option<&str>,
        playlist_id: &PlaylistId,
    ) -> Result<Playlist> {
        let url = self.endpoint(&format!("/{}", playlist_id.mbid()));
        debug!(url = %url, "Fetching playlist");

        let mut request = self.http.get(&url);
        if let Some(token) = auth_token.filter(|t| !t.trim().is_empty()) {
            request = request.bearer_auth(token);
        }
        let response = self.send(request, "playlist").await?;

        let document: JspfDocument = response.json().await.map_err(|e| {
            ApiError::ParseError(format!("Failed to parse playlist response: {}", e))
        })?;

        debug!(
            playlist_id = %document.playlist.identifier,
            tracks = document.playlist.track.len(),
            "Fetched playlist"
        );
        Ok(document.playlist)
    }

    async fn create_playlist(&self, auth_token: &str, playlist: &Playlist) -> Result<PlaylistId> {
        let token = require_token(auth_token)?;
        let url = self.endpoint("/create");
        debug!(url = %url, title = %playlist.title, "Creating playlist");

        let body = serde_json::json!({ "playlist": playlist });
        let response = self
            .send(self.http.post(&url).bearer_auth(token).json(&body), "create")
            .await?;

        let created: PlaylistCreatedResponse = response.json().await.map_err(|e| {
            ApiError::ParseError(format!("Failed to parse create response: {}", e))
        })?;
        let id = PlaylistId::from_mbid(&created.playlist_mbid)?;

        info!(playlist_id = %id, "Playlist created");
        Ok(id)
    }

    async fn copy_playlist(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
    ) -> Result<PlaylistId> {
        let token = require_token(auth_token)?;
        let url = self.endpoint(&format!("/{}/copy", playlist_id.mbid()));
        debug!(url = %url, "Copying playlist");

        let response = self
            .send(self.http.post(&url).bearer_auth(token), "playlist")
            .await?;

        let created: PlaylistCreatedResponse = response.json().await.map_err(|e| {
            ApiError::ParseError(format!("Failed to parse copy response: {}", e))
        })?;
        let id = PlaylistId::from_mbid(&created.playlist_mbid)?;

        info!(source = %playlist_id, playlist_id = %id, "Playlist copied");
        Ok(id)
    }

    async fn add_track(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
        track: &Track,
    ) -> Result<()> {
        let token = require_token(auth_token)?;
        let url = self.endpoint(&format!("/{}/item/add", playlist_id.mbid()));
        debug!(url = %url, track = %track.identifier, "Adding track");

        let body = AddItemsRequest {
            playlist: TrackList {
                track: std::slice::from_ref(track),
            },
        };
        self.send(self.http.post(&url).bearer_auth(token).json(&body), "playlist")
            .await?;

        info!(playlist_id = %playlist_id, track = %track.identifier, "Track added");
        Ok(())
    }

    async fn delete_track(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
        recording_id: &RecordingId,
        index: usize,
    ) -> Result<()> {
        let token = require_token(auth_token)?;
        let url = self.endpoint(&format!("/{}/item/delete", playlist_id.mbid()));
        debug!(url = %url, recording = %recording_id, index, "Deleting track");

        let body = DeleteItemRequest {
            mbid: recording_id.as_str(),
            index,
            count: 1,
        };
        self.send(self.http.post(&url).bearer_auth(token).json(&body), "playlist item")
            .await?;

        info!(playlist_id = %playlist_id, recording = %recording_id, index, "Track deleted");
        Ok(())
    }

    async fn move_track(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
        recording_id: &RecordingId,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<()> {
        let token = require_token(auth_token)?;
        let url = self.endpoint(&format!("/{}/item/move", playlist_id.mbid()));
        debug!(url = %url, recording = %recording_id, from, to, count, "Moving tracks");

        let body = MoveItemRequest {
            mbid: recording_id.as_str(),
            from,
            to,
            count,
        };
        self.send(self.http.post(&url).bearer_auth(token).json(&body), "playlist item")
            .await?;

        info!(playlist_id = %playlist_id, from, to, count, "Tracks moved");
        Ok(())
    }

    async fn edit_metadata(&self, auth_token: &str, playlist: &Playlist) -> Result<()> {
        let token = require_token(auth_token)?;
        let playlist_id = &playlist.identifier;
        let url = self.endpoint(&format!("/edit/{}", playlist_id.mbid()));
        debug!(url = %url, "Editing playlist metadata");

        // Re-normalize so the owner never lands in the collaborators
        let mut edited = playlist.clone();
        edited.apply_metadata(&MetadataPatch::from_playlist(playlist));
        let body = EditPlaylistRequest::from_playlist(&edited)?;
        self.send(self.http.post(&url).bearer_auth(token).json(&body), "playlist")
            .await?;

        info!(playlist_id = %playlist_id, "Playlist metadata saved");
        Ok(())
    }

    async fn delete_playlist(&self, auth_token: &str, playlist_id: &PlaylistId) -> Result<()> {
        let token = require_token(auth_token)?;
        let url = self.endpoint(&format!("/{}/delete", playlist_id.mbid()));
        debug!(url = %url, "Deleting playlist");

        self.send(self.http.post(&url).bearer_auth(token), "playlist")
            .await?;

        info!(playlist_id = %playlist_id, "Playlist deleted");
        Ok(())
    }

    async fn export_to_format(
        &self,
        auth_token: &str,
        playlist_id: &PlaylistId,
        format: ExportFormat,
    ) -> Result<ExportedPlaylist> {
        let token = require_token(auth_token)?;
        let url = self.endpoint(&format!(
            "/{}/export/{}",
            playlist_id.mbid(),
            format.extension()
        ));
        debug!(url = %url, "Exporting playlist");

        let response = self
            .send(self.http.get(&url).bearer_auth(token), "playlist")
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(format.mime_type())
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(ApiError::from_transport)?
            .to_vec();

        debug!(playlist_id = %playlist_id, size = bytes.len(), "Playlist exported");
        Ok(ExportedPlaylist {
            format,
            content_type,
            filename: format!("{}.{}", playlist_id.mbid(), format.extension()),
            bytes,
        })
    }
}
