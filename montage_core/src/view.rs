// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only snapshot of what the page should show.
//!
//! A [`View`] borrows from the controller and is rebuilt after every input;
//! presenters render it and hold on to nothing.

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;

use crate::controller::PlaybackController;
use crate::embed::{self, ProviderFamily};
use crate::gallery::Tile;
use crate::playlist::PlaylistItem;
use crate::session::{PlaybackTicket, Stage};

/// The landing screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandingView {
    /// Number of configured items.
    pub count: usize,
    /// Whether the background track is muted.
    pub background_muted: bool,
}

/// One item on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayingView<'a> {
    /// The item.
    pub item: PlaylistItem<'a>,
    /// Identity of this playback; embed callbacks must carry it back.
    pub ticket: PlaybackTicket,
    /// Frame source with autoplay hints applied.
    pub embed_url: Cow<'a, str>,
    /// Provider, if recognized; decides how "ended" is observed.
    pub family: Option<ProviderFamily>,
    /// Number of configured items.
    pub count: usize,
    /// `true` while fading out after "ended".
    pub is_transitioning: bool,
    /// Whether the background track is muted.
    pub background_muted: bool,
}

impl PlayingView<'_> {
    /// Frame title, e.g. `Video 1`.
    #[must_use]
    pub fn title(&self) -> String {
        self.item.label()
    }

    /// Progress caption, e.g. `Playing 1 of 2`.
    #[must_use]
    pub fn progress(&self) -> String {
        format!("Playing {} of {}", self.item.index + 1, self.count)
    }

    /// Opacity of the frame: hidden during the fade.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        if self.is_transitioning { 0.0 } else { 1.0 }
    }
}

/// The thumbnail grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GalleryView<'a> {
    /// One tile per item, in order.
    pub tiles: &'a [Tile],
    /// Whether the background track is muted.
    pub background_muted: bool,
}

/// What to render for the current stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View<'a> {
    /// See [`LandingView`].
    Landing(LandingView),
    /// See [`PlayingView`].
    Playing(PlayingView<'a>),
    /// See [`GalleryView`].
    Gallery(GalleryView<'a>),
}

impl View<'_> {
    /// Stage this view renders.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Landing(_) => Stage::Landing,
            Self::Playing(_) => Stage::Playing,
            Self::Gallery(_) => Stage::Gallery,
        }
    }
}

impl PlaybackController {
    /// Snapshot of the current stage for a presenter.
    #[must_use]
    pub fn view(&self) -> View<'_> {
        let state = self.state();
        let background_muted = state.background_muted();
        let playing = state
            .ticket()
            .and_then(|ticket| Some((ticket, self.playlist().get(ticket.index)?)));
        match (state.stage(), playing) {
            (Stage::Playing, Some((ticket, item))) => View::Playing(PlayingView {
                ticket,
                embed_url: embed::resolve_playback_url(item.url),
                family: ProviderFamily::detect(item.url),
                item,
                count: self.playlist().len(),
                is_transitioning: state.is_transitioning(),
                background_muted,
            }),
            (Stage::Gallery, _) => View::Gallery(GalleryView {
                tiles: self.tiles(),
                background_muted,
            }),
            _ => View::Landing(LandingView {
                count: self.playlist().len(),
                background_muted,
            }),
        }
    }
}
