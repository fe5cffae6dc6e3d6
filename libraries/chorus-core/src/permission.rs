//! Edit permissions on a playlist.

use crate::types::Playlist;
use serde::{Deserialize, Serialize};

/// Who may add, remove, reorder tracks or edit metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
    /// The owner and listed collaborators; everyone else is denied.
    #[default]
    OwnerOrCollaborator,

    /// Legacy web-client predicate: any viewer who is not the owner is
    /// allowed, and the owner only when also listed as a collaborator.
    AnyNonOwner,
}

impl EditPolicy {
    /// Whether `viewer` may mutate `playlist`. `None` is an anonymous viewer.
    pub fn allows(self, playlist: &Playlist, viewer: Option<&str>) -> bool {
        match self {
            EditPolicy::OwnerOrCollaborator => viewer.is_some_and(|name| {
                playlist.is_owner(name) || playlist.is_collaborator(name)
            }),
            EditPolicy::AnyNonOwner => match viewer {
                Some(name) if playlist.is_owner(name) => playlist.is_collaborator(name),
                _ => true,
            },
        }
    }
}
