/// Editable playlist metadata
use crate::types::{same_user, Playlist};
use serde::{Deserialize, Serialize};

/// Title, description, visibility and collaborators submitted by an edit form
///
/// Never carries tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPatch {
    /// New title
    pub title: String,
    /// New description
    pub annotation: String,
    /// New public flag
    pub public: bool,
    /// New collaborator set; may include the owner, who is stripped
    pub collaborators: Vec<String>,
}

impl MetadataPatch {
    /// Patch reproducing the playlist's current metadata
    pub fn from_playlist(playlist: &Playlist) -> Self {
        Self {
            title: playlist.title.clone(),
            annotation: playlist.annotation.clone(),
            public: playlist.is_public(),
            collaborators: playlist.collaborators().to_vec(),
        }
    }

    /// Copy with the owner and duplicate names removed from the collaborators
    pub fn normalized_for(&self, owner: &str) -> Self {
        let mut collaborators: Vec<String> = Vec::with_capacity(self.collaborators.len());
        for name in &self.collaborators {
            let name = name.trim();
            if name.is_empty() || same_user(name, owner) {
                continue;
            }
            if collaborators.iter().any(|c| same_user(c, name)) {
                continue;
            }
            collaborators.push(name.to_string());
        }

        Self {
            title: self.title.clone(),
            annotation: self.annotation.clone(),
            public: self.public,
            collaborators,
        }
    }

    /// Whether applying this patch would leave `playlist` unchanged
    pub fn is_noop_for(&self, playlist: &Playlist) -> bool {
        self.normalized_for(&playlist.creator) == MetadataPatch::from_playlist(playlist)
    }
}
