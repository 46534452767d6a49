// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view-state machine: stage, current item, transition flag, mute flag.
//!
//! [`SessionState`] is the only mutable entity of a session. Its mutators are
//! crate-private; [`PlaybackController`](crate::controller::PlaybackController)
//! is the sole writer. The current index is only observable while the stage
//! is [`Stage::Playing`], and it is always inside the playlist: advancing past
//! the last item moves to [`Stage::Gallery`] instead.
//!
//! Each time an item is entered the session's epoch is bumped. The
//! `(index, epoch)` pair is handed out as a [`PlaybackTicket`] so that
//! late callbacks (an "ended" message from an iframe that has since been
//! replaced, say) can be recognized and dropped.

use core::fmt;

use crate::error::CommandError;

/// Coarse view mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Start screen with the play and "view all" buttons.
    #[default]
    Landing,
    /// One item is on screen and playing.
    Playing,
    /// Thumbnail grid of every item.
    Gallery,
}

impl Stage {
    /// Short lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Playing => "playing",
            Self::Gallery => "gallery",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one playback of one item.
///
/// Two entries of the same index (e.g. replaying item 0) get distinct
/// tickets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaybackTicket {
    /// Playlist index of the item.
    pub index: usize,
    /// Session epoch at the time the item was entered.
    pub epoch: u64,
}

/// Result of advancing past the current item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// The next item was entered.
    Next(PlaybackTicket),
    /// The last item was passed; the session is now in the gallery.
    Finished,
}

/// Mutable state of one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    stage: Stage,
    current_index: usize,
    is_transitioning: bool,
    background_muted: bool,
    epoch: u64,
    len: usize,
}

impl SessionState {
    /// Creates the initial state for a playlist of `len` items.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            stage: Stage::Landing,
            current_index: 0,
            is_transitioning: false,
            background_muted: false,
            epoch: 0,
            len,
        }
    }

    /// Current stage.
    #[inline]
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Index of the item on screen, or `None` outside [`Stage::Playing`].
    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        match self.stage {
            Stage::Playing => Some(self.current_index),
            Stage::Landing | Stage::Gallery => None,
        }
    }

    /// Ticket of the item on screen, or `None` outside [`Stage::Playing`].
    #[must_use]
    pub const fn ticket(&self) -> Option<PlaybackTicket> {
        match self.stage {
            Stage::Playing => Some(PlaybackTicket {
                index: self.current_index,
                epoch: self.epoch,
            }),
            Stage::Landing | Stage::Gallery => None,
        }
    }

    /// `true` during the fade between two playing items.
    #[inline]
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    /// Whether the background track is muted.
    #[inline]
    #[must_use]
    pub const fn background_muted(&self) -> bool {
        self.background_muted
    }

    /// Number of items in the playlist this state tracks.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the playlist is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Enters `Playing` at `index`.
    pub(crate) fn enter_item(&mut self, index: usize) -> Result<PlaybackTicket, CommandError> {
        if index >= self.len {
            return Err(CommandError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        self.stage = Stage::Playing;
        self.current_index = index;
        self.is_transitioning = false;
        self.epoch = self.epoch.wrapping_add(1);
        Ok(PlaybackTicket {
            index,
            epoch: self.epoch,
        })
    }

    /// Moves to the next item, or to the gallery after the last one.
    ///
    /// Only meaningful while playing; callers check the stage first.
    pub(crate) fn advance(&mut self) -> Advance {
        let next = self.current_index + 1;
        match self.enter_item(next) {
            Ok(ticket) => Advance::Next(ticket),
            Err(_) => {
                self.enter_gallery();
                Advance::Finished
            }
        }
    }

    pub(crate) fn enter_gallery(&mut self) {
        self.stage = Stage::Gallery;
        self.current_index = 0;
        self.is_transitioning = false;
    }

    pub(crate) fn enter_landing(&mut self) {
        self.stage = Stage::Landing;
        self.current_index = 0;
        self.is_transitioning = false;
    }

    pub(crate) fn set_transitioning(&mut self, transitioning: bool) {
        self.is_transitioning = transitioning;
    }

    /// Flips the mute flag and returns the new value.
    pub(crate) fn toggle_muted(&mut self) -> bool {
        self.background_muted = !self.background_muted;
        self.background_muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_landing_without_an_index() {
        let state = SessionState::new(3);
        assert_eq!(state.stage(), Stage::Landing);
        assert_eq!(state.current_index(), None);
        assert_eq!(state.ticket(), None);
        assert!(!state.is_transitioning());
    }

    #[test]
    fn advancing_reaches_gallery_exactly_once() {
        for len in 1..6 {
            let mut state = SessionState::new(len);
            state.enter_item(0).unwrap();
            let mut seen = alloc::vec![0];
            let mut finished = 0;
            while state.stage() == Stage::Playing {
                match state.advance() {
                    Advance::Next(ticket) => seen.push(ticket.index),
                    Advance::Finished => finished += 1,
                }
                if let Some(index) = state.current_index() {
                    assert!(index < len, "index {index} escaped playlist of {len}");
                }
            }
            assert_eq!(finished, 1, "len {len}");
            assert_eq!(seen, (0..len).collect::<alloc::vec::Vec<_>>());
            assert_eq!(state.stage(), Stage::Gallery);
        }
    }

    #[test]
    fn entering_out_of_range_is_rejected_without_change() {
        let mut state = SessionState::new(2);
        let before = state.clone();
        assert_eq!(
            state.enter_item(2),
            Err(CommandError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn empty_session_never_plays() {
        let mut state = SessionState::new(0);
        assert!(state.enter_item(0).is_err());
        assert_eq!(state.stage(), Stage::Landing);
    }

    #[test]
    fn re_entering_an_item_issues_a_new_ticket() {
        let mut state = SessionState::new(1);
        let first = state.enter_item(0).unwrap();
        state.enter_gallery();
        let second = state.enter_item(0).unwrap();
        assert_eq!(first.index, second.index);
        assert_ne!(first, second);
    }

    #[test]
    fn mute_toggle_leaves_stage_alone() {
        let mut state = SessionState::new(2);
        state.enter_item(1).unwrap();
        assert!(state.toggle_muted());
        assert!(!state.toggle_muted());
        assert_eq!(state.stage(), Stage::Playing);
        assert_eq!(state.current_index(), Some(1));
    }
}
