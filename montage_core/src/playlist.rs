// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fixed, ordered list of items a session plays.
//!
//! A [`Playlist`] is built once at startup and never mutated. Items are
//! identified by their position; [`PlaylistItem`] is a borrowed view pairing
//! that position with the configured URL.

use alloc::string::String;
use alloc::vec::Vec;

/// One playable entry: the configured URL and its position in the playlist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaylistItem<'a> {
    /// Position in the playlist, starting at zero.
    pub index: usize,
    /// Embeddable video location, exactly as configured.
    pub url: &'a str,
}

impl PlaylistItem<'_> {
    /// Returns the one-based display label, e.g. `"Video 3"`.
    #[must_use]
    pub fn label(&self) -> String {
        item_label(self.index)
    }
}

/// Returns the display label for the item at `index`.
#[must_use]
pub fn item_label(index: usize) -> String {
    alloc::format!("Video {}", index + 1)
}

/// Immutable ordered sequence of video URLs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Playlist {
    urls: Vec<String>,
}

impl Playlist {
    /// Creates a playlist from configured URLs, preserving order.
    #[must_use]
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns `true` if no items are configured.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Returns the item at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<PlaylistItem<'_>> {
        self.urls
            .get(index)
            .map(|url| PlaylistItem { index, url })
    }

    /// Iterates over all items in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = PlaylistItem<'_>> + '_ {
        self.urls
            .iter()
            .enumerate()
            .map(|(index, url)| PlaylistItem { index, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_keep_configured_order() {
        let playlist = Playlist::new(["a", "b", "c"]);
        let urls: Vec<&str> = playlist.iter().map(|item| item.url).collect();
        assert_eq!(urls, ["a", "b", "c"]);
        assert_eq!(playlist.get(1).map(|item| item.index), Some(1));
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let playlist = Playlist::new(["a"]);
        assert!(playlist.get(1).is_none());
        assert!(Playlist::default().get(0).is_none());
        assert!(Playlist::default().is_empty());
    }

    #[test]
    fn labels_are_one_based() {
        let playlist = Playlist::new(["a", "b"]);
        assert_eq!(playlist.get(0).map(|item| item.label()).as_deref(), Some("Video 1"));
        assert_eq!(item_label(9), "Video 10");
    }
}
