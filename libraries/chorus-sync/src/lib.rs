//! Chorus live playlist sessions
//!
//! Keeps several viewers of one collaborative playlist in agreement:
//!
//! - [`PlaylistSession`] holds a viewer's copy, gates edits by ownership and
//!   collaborator rights, persists them through a
//!   [`PlaylistGateway`](chorus_client::PlaylistGateway) and broadcasts the
//!   result.
//! - [`ChangeChannel`] is the per-playlist push subscription, backed by a
//!   websocket ([`WebSocketConnector`]) or an in-process [`RelayHub`].
//! - [`ChorusConfig`] and [`telemetry`] cover configuration and logging.
//!
//! # Example
//!
//! ```ignore
//! use chorus_client::PlaylistApiClient;
//! use chorus_sync::{ChorusConfig, PlaylistSession, Viewer};
//! use std::sync::Arc;
//!
//! chorus_sync::telemetry::init_tracing();
//! let config = ChorusConfig::load()?;
//! config.validate()?;
//!
//! let gateway = Arc::new(PlaylistApiClient::new(config.client_config())?);
//! let connector = Arc::new(config.websocket_connector()?);
//! let session = Arc::new(
//!     PlaylistSession::load(
//!         gateway,
//!         connector,
//!         &playlist_id,
//!         Some(Viewer::new("alice", token)),
//!         config.session_options(),
//!     )
//!     .await?,
//! );
//! session.spawn_listener();
//! session.move_track(2, 0).await?;
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod message;
pub mod relay;
pub mod session;
pub mod telemetry;
pub mod transport;
pub mod websocket;

pub use channel::{ChangeChannel, ChannelEvent};
pub use config::ChorusConfig;
pub use error::{ChannelError, Result, SessionError};
pub use message::ChannelMessage;
pub use relay::RelayHub;
pub use session::{
    MutationOutcome, Notice, NoticeLevel, PlaylistSession, RemoteUpdate, SessionCore,
    SessionOptions, SessionState, Viewer,
};
pub use transport::{ChannelConnector, ChannelTransport};
pub use websocket::WebSocketConnector;
