//! Chorus Playlist API Client
//!
//! HTTP client library for the external Playlist API.
//!
//! # Features
//!
//! - **Playlists**: fetch, create, copy, edit metadata, delete
//! - **Items**: add, delete (index-checked), move contiguous runs
//! - **Export**: download a playlist as XSPF/JSPF and save it under its title
//!
//! Operations are exposed through the [`PlaylistGateway`] trait so sessions
//! can be driven by any implementation; [`PlaylistApiClient`] is the reqwest
//! one.
//!
//! # Example
//!
//! ```ignore
//! use chorus_client::{ClientConfig, ExportFormat, PlaylistApiClient, PlaylistGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PlaylistApiClient::new(ClientConfig::new("https://api.listenbrainz.org"))?;
//!     let playlist = client.get_playlist(Some("token"), &playlist_id).await?;
//!
//!     let export = client
//!         .export_to_format("token", &playlist.identifier, ExportFormat::Xspf)
//!         .await?
//!         .with_title(&playlist.title);
//!     export.save_to_dir(std::path::Path::new("downloads")).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod export;
mod gateway;
mod types;

pub use client::PlaylistApiClient;
pub use error::{ApiError, Result};
pub use gateway::PlaylistGateway;
pub use types::{ClientConfig, ExportFormat, ExportedPlaylist};
