//! Chorus Core
//!
//! Platform-agnostic playlist document model for Chorus.
//!
//! This crate provides the types shared by the Playlist API client and the
//! collaborative session controller.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: JSPF `Playlist`, `Track` and their extension blocks
//! - **Ordering operations**: append, checked removal, contiguous moves
//! - **Permissions**: ownership, collaborators and the `EditPolicy` predicate
//! - **Collections**: sorting a user's playlist list
//! - **Error Handling**: `PlaylistError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use chorus_core::{EditPolicy, Playlist, PlaylistId, Track};
//!
//! let id = PlaylistId::from_mbid("4b7c8b6a-3e3a-4d5e-9a57-0c1a0f5a4a11").unwrap();
//! let mut playlist = Playlist::new(id, "Road trip", "alice");
//! playlist.extension_mut().collaborators.push("bob".to_string());
//!
//! playlist.append_track(Track::from_recording(
//!     "8f3471b5-7e6a-48da-86a9-c1c07a0f47ae",
//!     "Strangers",
//!     "Portishead",
//! ));
//!
//! assert!(EditPolicy::OwnerOrCollaborator.allows(&playlist, Some("bob")));
//! assert!(!EditPolicy::OwnerOrCollaborator.allows(&playlist, Some("carol")));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collection;
pub mod error;
pub mod permission;
pub mod types;

pub use collection::{PlaylistCollection, PlaylistTab, SortOption};
pub use error::{PlaylistError, Result};
pub use permission::EditPolicy;
pub use types::{
    JspfDocument, MetadataPatch, Playlist, PlaylistExtension, PlaylistExtensions, PlaylistId,
    RecordingId, Track, TrackExtension, TrackExtensions, PLAYLIST_EXTENSION_URI,
    PLAYLIST_URI_PREFIX, RECORDING_URI_PREFIX, TRACK_EXTENSION_URI,
};
