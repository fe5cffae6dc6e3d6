//! Transport-free session state.
//!
//! `SessionCore` is the reducer behind a [`PlaylistSession`](super::PlaylistSession):
//! it owns the local playlist copy, counts calls in flight and decides
//! whether a completed call still applies to what the viewer is looking at.

use chorus_core::{
    EditPolicy, MetadataPatch, Playlist, PlaylistError, PlaylistId, RecordingId, Track,
};

/// Whether any remote call is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Mutating,
}

/// Issued when a remote call starts; handed back when it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    generation: u64,
}

/// What a remote change did to the local copy
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteUpdate {
    /// The local playlist was replaced by this document
    Replaced(Box<Playlist>),
    /// The change was for a playlist this session no longer shows
    Ignored { playlist_id: PlaylistId },
    /// The channel dropped; live updates stop until reconnect
    Disconnected { reason: String },
}

#[derive(Debug)]
pub struct SessionCore {
    playlist: Playlist,
    policy: EditPolicy,
    in_flight: usize,
    // Bumped when the session switches playlist
    epoch: u64,
    // Bumped whenever track positions may have shifted under a call in flight
    generation: u64,
    closed: bool,
}

impl SessionCore {
    pub fn new(playlist: Playlist, policy: EditPolicy) -> Self {
        Self {
            playlist,
            policy,
            in_flight: 0,
            epoch: 0,
            generation: 0,
            closed: false,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn policy(&self) -> EditPolicy {
        self.policy
    }

    pub fn state(&self) -> SessionState {
        if self.in_flight == 0 {
            SessionState::Idle
        } else {
            SessionState::Mutating
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Permission gate for track and metadata changes
    pub fn has_right_to_edit(&self, viewer: Option<&str>) -> bool {
        self.playlist.can_edit(viewer, self.policy)
    }

    /// Record the start of a remote call
    pub fn begin(&mut self) -> Ticket {
        self.in_flight += 1;
        Ticket {
            epoch: self.epoch,
            generation: self.generation,
        }
    }

    /// Record the end of a remote call; `false` when the view has since moved
    /// to another playlist and the result must not be applied.
    pub fn finish(&mut self, ticket: &Ticket) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        ticket.epoch == self.epoch
    }

    /// Whether the local copy is still the one `ticket` was issued against
    pub fn same_copy(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch && ticket.generation == self.generation
    }

    pub fn append(&mut self, track: Track) {
        self.playlist.append_track(track);
    }

    pub fn remove(&mut self, index: usize, recording: &RecordingId) -> Result<Track, PlaylistError> {
        let track = self.playlist.remove_track_at(index, recording)?;
        self.generation += 1;
        Ok(track)
    }

    /// Apply a move before the server confirms it; returns the ticket to
    /// hand back on completion.
    pub fn move_optimistically(
        &mut self,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<Ticket, PlaylistError> {
        self.playlist.move_tracks(from, to, count)?;
        self.generation += 1;
        Ok(self.begin())
    }

    /// Undo an optimistic move with the inverse move.
    ///
    /// Returns whether the rollback was applied. When the list changed after
    /// the optimistic move (a local delete or move, or another viewer's
    /// document) the inverse no longer fits and the list is left alone; the
    /// caller reloads it instead.
    pub fn roll_back_move(
        &mut self,
        ticket: &Ticket,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<bool, PlaylistError> {
        if !self.same_copy(ticket) {
            return Ok(false);
        }
        self.playlist.move_tracks(to, from, count)?;
        self.generation += 1;
        Ok(true)
    }

    pub fn apply_metadata(&mut self, patch: &MetadataPatch) {
        self.playlist.apply_metadata(patch);
    }

    /// Replace the local copy with a document pushed by another viewer
    pub fn apply_remote(&mut self, playlist: Playlist) -> RemoteUpdate {
        if playlist.identifier != self.playlist.identifier {
            return RemoteUpdate::Ignored {
                playlist_id: playlist.identifier,
            };
        }
        self.playlist = playlist;
        self.generation += 1;
        RemoteUpdate::Replaced(Box::new(self.playlist.clone()))
    }

    /// Replace the local copy with a document fetched from the server
    pub fn reload(&mut self, playlist: Playlist) {
        self.playlist = playlist;
        self.generation += 1;
    }

    /// Show another playlist; calls still in flight for the old one become stale
    pub fn switch_to(&mut self, playlist: Playlist) {
        self.playlist = playlist;
        self.epoch += 1;
        self.generation += 1;
        self.closed = false;
    }
}
