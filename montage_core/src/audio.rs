// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Background audio commands and play-request outcomes.
//!
//! The session owns a single looping background track. It never waits on
//! the track: a [`AudioCommand::Play`] request is fire-and-forget, and the
//! host reports how it settled later as an [`AudioOutcome`]. A rejection is
//! only recorded; it is not retried and never changes the stage.

use core::fmt;

/// A request to the host's background audio element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AudioCommand {
    /// Set playback volume, `0.0..=1.0`.
    SetVolume(f32),
    /// Start (or resume) playback.
    Play,
    /// Mute or unmute without pausing.
    SetMuted(bool),
}

/// Why the host refused to start the background track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioRejection {
    /// Autoplay policy: no user activation yet.
    NotAllowed,
    /// The source could not be decoded or loaded.
    NotSupported,
    /// The request was interrupted by a pause or a new load.
    Aborted,
    /// Anything else the host reported.
    Other,
}

impl AudioRejection {
    /// Maps a `DOMException` name to a rejection reason.
    #[must_use]
    pub fn from_exception_name(name: &str) -> Self {
        match name {
            "NotAllowedError" => Self::NotAllowed,
            "NotSupportedError" => Self::NotSupported,
            "AbortError" => Self::Aborted,
            _ => Self::Other,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAllowed => "not-allowed",
            Self::NotSupported => "not-supported",
            Self::Aborted => "aborted",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AudioRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a [`AudioCommand::Play`] request settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioOutcome {
    /// The track is playing.
    Playing,
    /// The host refused to play.
    Rejected(AudioRejection),
}
