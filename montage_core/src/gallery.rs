// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gallery tiles: one clickable preview per playlist item.
//!
//! [`tiles`] is a pure function of the playlist. Each tile's thumbnail comes
//! from the provider when a video id can be extracted from the item URL
//! ([`extract_video_id`]); otherwise a placeholder image is generated whose
//! background color depends only on the item index.

use alloc::string::String;
use alloc::vec::Vec;

use crate::playlist::{Playlist, PlaylistItem, item_label};

/// Length of a provider video id.
pub const VIDEO_ID_LEN: usize = 11;

/// Placeholder background colors, picked by `index % PLACEHOLDER_PALETTE.len()`.
pub const PLACEHOLDER_PALETTE: [&str; 5] = ["f97316", "fb7185", "60a5fa", "34d399", "f59e0b"];

/// Where a tile's thumbnail comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Thumbnail {
    /// Provider-hosted still for the extracted video id.
    Provider {
        /// The 11-character video id.
        video_id: String,
    },
    /// Generated placeholder with a palette background.
    Placeholder {
        /// Hex color (no `#`) from [`PLACEHOLDER_PALETTE`].
        color: &'static str,
    },
}

/// A gallery preview for one playlist item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Position of the item in the playlist; clicking the tile jumps here.
    pub index: usize,
    /// Display label, `"Video <index + 1>"`.
    pub label: String,
    /// Thumbnail source.
    pub thumbnail: Thumbnail,
    /// Resolved thumbnail image URL.
    pub thumbnail_url: String,
}

/// Builds one tile per playlist item, in playlist order.
#[must_use]
pub fn tiles(playlist: &Playlist) -> Vec<Tile> {
    playlist.iter().map(|item| tile(&item)).collect()
}

/// Builds the tile for a single item.
#[must_use]
pub fn tile(item: &PlaylistItem<'_>) -> Tile {
    let label = item_label(item.index);
    let thumbnail = match extract_video_id(item.url) {
        Some(id) => Thumbnail::Provider {
            video_id: String::from(id),
        },
        None => Thumbnail::Placeholder {
            color: placeholder_color(item.index),
        },
    };
    let thumbnail_url = match &thumbnail {
        Thumbnail::Provider { video_id } => provider_thumbnail_url(video_id),
        Thumbnail::Placeholder { .. } => placeholder_thumbnail_url(item.index),
    };
    Tile {
        index: item.index,
        label,
        thumbnail,
        thumbnail_url,
    }
}

/// Still image URL for a provider video id.
#[must_use]
pub fn provider_thumbnail_url(video_id: &str) -> String {
    alloc::format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg")
}

/// Palette color for the placeholder of item `index`.
#[must_use]
pub const fn placeholder_color(index: usize) -> &'static str {
    PLACEHOLDER_PALETTE[index % PLACEHOLDER_PALETTE.len()]
}

/// Placeholder image URL for item `index`, with its label as overlay text.
#[must_use]
pub fn placeholder_thumbnail_url(index: usize) -> String {
    let color = placeholder_color(index);
    alloc::format!(
        "https://via.placeholder.com/480x270/{color}/ffffff?text=Video+{}",
        index + 1
    )
}

/// Extracts the 11-character video id from a YouTube URL.
///
/// Recognized shapes, after a `youtube.com/` (or `youtube-nocookie.com/`)
/// host:
///
/// - `<segment>/<path>/<id>`, e.g. `/user/name/<id>`
/// - `v/<id>`, `e/<id>`, `embed/<id>`
/// - any `?v=<id>` or `&v=<id>` further along the URL
///
/// plus the `youtu.be/<id>` short host. The id is `[A-Za-z0-9_-]{11}`;
/// anything may follow it. The leftmost host occurrence wins, and for one
/// occurrence the shapes are tried in the order listed.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<&str> {
    for (start, _) in url.char_indices() {
        let rest = &url[start..];
        if let Some(after) = rest.strip_prefix("youtu.be/") {
            if let Some(id) = id_prefix(after) {
                return Some(id);
            }
            continue;
        }
        let after_host = rest
            .strip_prefix("youtube.com/")
            .or_else(|| rest.strip_prefix("youtube-nocookie.com/"));
        if let Some(path) = after_host
            && let Some(id) = nested_path_id(path)
                .or_else(|| short_path_id(path))
                .or_else(|| query_id(path))
        {
            return Some(id);
        }
    }
    None
}

/// `<segment>/<non-space run>/<id>`, preferring the last `/` of the run.
fn nested_path_id(path: &str) -> Option<&str> {
    let segment_len = path.find(|c: char| c == '/' || c.is_whitespace())?;
    if segment_len == 0 || !path[segment_len..].starts_with('/') {
        return None;
    }
    let tail = &path[segment_len + 1..];
    let run_len = tail.find(char::is_whitespace).unwrap_or(tail.len());
    let run = &tail[..run_len];
    // The run before the final slash must be non-empty.
    run.char_indices()
        .rev()
        .filter(|&(i, c)| c == '/' && i > 0)
        .find_map(|(i, _)| id_prefix(&tail[i + 1..]))
}

/// `v/<id>`, `e/<id>` or `embed/<id>`.
fn short_path_id(path: &str) -> Option<&str> {
    ["v/", "e/", "embed/"]
        .iter()
        .find_map(|prefix| path.strip_prefix(prefix).and_then(id_prefix))
}

/// The last `?v=<id>` or `&v=<id>` on the current line.
fn query_id(path: &str) -> Option<&str> {
    let line = path.split('\n').next().unwrap_or(path);
    line.char_indices()
        .rev()
        .filter(|&(_, c)| c == '?' || c == '&')
        .find_map(|(i, _)| line[i + 1..].strip_prefix("v=").and_then(id_prefix))
}

/// Returns the first [`VIDEO_ID_LEN`] bytes of `s` if they are all id characters.
fn id_prefix(s: &str) -> Option<&str> {
    let candidate = s.get(..VIDEO_ID_LEN)?;
    candidate
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        .then_some(candidate)
}
