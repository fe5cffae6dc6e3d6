//! A user's list of playlists and how it is ordered.

use crate::types::Playlist;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering of a playlist list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Newest first
    #[default]
    DateCreated,
    /// Most recently modified first
    DateUpdated,
    /// Title A-Z, case-insensitive
    Title,
    /// Owner A-Z, case-insensitive
    Creator,
    /// Shuffled
    Random,
}

impl SortOption {
    /// Tie-breakers are applied in this order after the chosen criterion
    const CRITERIA: [SortOption; 4] = [
        SortOption::DateCreated,
        SortOption::Title,
        SortOption::Creator,
        SortOption::DateUpdated,
    ];

    fn compare(self, a: &Playlist, b: &Playlist) -> Ordering {
        match self {
            SortOption::DateCreated => b.date.cmp(&a.date),
            SortOption::DateUpdated => b.last_modified().cmp(&a.last_modified()),
            SortOption::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOption::Creator => a.creator.to_lowercase().cmp(&b.creator.to_lowercase()),
            SortOption::Random => Ordering::Equal,
        }
    }
}

/// Which of a user's playlists a page lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistTab {
    /// Playlists the user owns
    #[default]
    Playlists,
    /// Playlists the user collaborates on
    Collaborations,
}

/// Playlists shown on a user's playlist page
#[derive(Debug, Clone, Default)]
pub struct PlaylistCollection {
    playlists: Vec<Playlist>,
    sort: SortOption,
    tab: PlaylistTab,
    own_page: bool,
}

impl PlaylistCollection {
    /// Wrap a loaded page of playlists. `own_page` is set when the viewer is
    /// looking at their own playlists.
    pub fn new(playlists: Vec<Playlist>, own_page: bool) -> Self {
        Self {
            playlists,
            sort: SortOption::DateCreated,
            tab: PlaylistTab::Playlists,
            own_page,
        }
    }

    /// Current ordering
    pub fn sort_option(&self) -> SortOption {
        self.sort
    }

    /// Tab being shown
    pub fn tab(&self) -> PlaylistTab {
        self.tab
    }

    /// Show another tab; the caller loads its playlists
    pub fn set_tab(&mut self, tab: PlaylistTab, playlists: Vec<Playlist>) {
        self.tab = tab;
        self.playlists = playlists;
    }

    /// Playlists in display order
    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Number of playlists
    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Reorder the list
    pub fn sort_by(&mut self, option: SortOption) {
        self.sort_by_with_rng(option, &mut rand::thread_rng());
    }

    /// Reorder the list, drawing randomness from `rng` for `SortOption::Random`
    pub fn sort_by_with_rng<R: Rng + ?Sized>(&mut self, option: SortOption, rng: &mut R) {
        self.sort = option;
        if option == SortOption::Random {
            self.playlists.shuffle(rng);
            return;
        }

        let tie_breakers: Vec<SortOption> = SortOption::CRITERIA
            .into_iter()
            .filter(|c| *c != option)
            .collect();
        self.playlists.sort_by(|a, b| {
            tie_breakers
                .iter()
                .fold(option.compare(a, b), |ord, c| ord.then_with(|| c.compare(a, b)))
        });
    }

    /// A playlist was created: show it first
    pub fn on_created(&mut self, playlist: Playlist) {
        self.playlists.insert(0, playlist);
    }

    /// A playlist was copied; it only belongs in the viewer's own
    /// `Playlists` tab
    pub fn on_copied(&mut self, playlist: Playlist) {
        if self.own_page && self.tab == PlaylistTab::Playlists {
            self.playlists.insert(0, playlist);
        }
    }

    /// A playlist was edited: replace it in place. Returns false if unknown.
    pub fn on_edited(&mut self, playlist: Playlist) -> bool {
        match self
            .playlists
            .iter_mut()
            .find(|p| p.identifier == playlist.identifier)
        {
            Some(slot) => {
                *slot = playlist;
                true
            }
            None => false,
        }
    }

    /// A playlist was deleted
    pub fn on_deleted(&mut self, playlist: &Playlist) {
        self.playlists.retain(|p| p.identifier != playlist.identifier);
    }
}
