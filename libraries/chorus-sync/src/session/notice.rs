//! User-facing outcome notifications.

use crate::error::SessionError;
use serde::Serialize;

/// De-duplication key for successful track additions
pub const ADDED_TRACK: &str = "added-track";
/// Key for saved metadata
pub const SAVED_PLAYLIST: &str = "saved-playlist";
/// Key for a deleted playlist
pub const DELETED_PLAYLIST: &str = "delete-playlist-success";
/// Key for a copied playlist
pub const COPIED_PLAYLIST: &str = "copy-playlist-success";
/// Key for change channel trouble
pub const CHANNEL_ERROR: &str = "channel-error";
/// Key for authentication and permission failures
pub const AUTH_ERROR: &str = "auth-error";
/// Key for every other failure
pub const ERROR: &str = "error";

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast-style message about one operation's outcome.
///
/// Notices sharing a `key` replace each other in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    pub key: &'static str,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>, key: &'static str) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
            key,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>, key: &'static str) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
            key,
        }
    }

    /// Notice shown for a failed operation
    pub fn from_error(err: &SessionError) -> Self {
        match err {
            SessionError::Unauthenticated => Notice::error(
                "Error",
                "You must be logged in for this operation",
                AUTH_ERROR,
            ),
            SessionError::NotAuthorized | SessionError::Unauthorized(_) => Notice::error(
                "Not allowed",
                "You are not authorized to modify this playlist",
                AUTH_ERROR,
            ),
            other => Notice::error("Error", other.to_string(), ERROR),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
