//! Chorus configuration
use crate::error::{Result, SessionError};
use crate::session::{default_notice_capacity, SessionOptions};
use crate::websocket::WebSocketConnector;
use chorus_client::ClientConfig;
use chorus_core::EditPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChorusConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub channel: ChannelSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelSettings {
    #[serde(default = "default_channel_url")]
    pub url: String,

    #[serde(default = "default_channel_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub edit_policy: EditPolicy,

    #[serde(default)]
    pub serialize_mutations: bool,

    #[serde(default = "default_notice_capacity")]
    pub notice_capacity: usize,
}

impl ChorusConfig {
    /// Load from `chorus.toml` (if present) and `CHORUS_*` environment variables
    pub fn load() -> Result<Self> {
        let path = PathBuf::from("chorus.toml");
        Self::load_from(path.exists().then_some(path.as_path()))
    }

    /// Load from an explicit file plus the environment.
    ///
    /// Nested keys use a double underscore, e.g. `CHORUS_API__BASE_URL`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CHORUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| SessionError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| SessionError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let api = self.api.base_url.trim();
        if !api.starts_with("http://") && !api.starts_with("https://") {
            return Err(SessionError::Config(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 || self.api.connect_timeout_secs == 0 {
            return Err(SessionError::Config(
                "API timeouts must be at least one second".to_string(),
            ));
        }

        self.websocket_connector()?;

        if self.session.notice_capacity == 0 {
            return Err(SessionError::Config(
                "session.notice_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings for the Playlist API client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api.base_url.clone()).with_timeouts(
            Duration::from_secs(self.api.timeout_secs),
            Duration::from_secs(self.api.connect_timeout_secs),
        )
    }

    /// Connector for the configured push endpoint
    pub fn websocket_connector(&self) -> Result<WebSocketConnector> {
        Ok(WebSocketConnector::new(&self.channel.url, &self.channel.path)?)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            edit_policy: self.session.edit_policy,
            serialize_mutations: self.session.serialize_mutations,
            notice_capacity: self.session.notice_capacity,
        }
    }
}

// Default values
impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            url: default_channel_url(),
            path: default_channel_path(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            edit_policy: EditPolicy::default(),
            serialize_mutations: false,
            notice_capacity: default_notice_capacity(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.listenbrainz.org".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_channel_url() -> String {
    "wss://listenbrainz.org".to_string()
}

fn default_channel_path() -> String {
    "/socket.io/".to_string()
}
