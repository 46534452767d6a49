// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command rejections.

use crate::controller::InputKind;
use crate::session::Stage;

/// Why the controller refused an input.
///
/// A rejected input never changes the session. None of these are fatal;
/// hosts record them and keep going.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// A jump targeted an index outside the playlist.
    #[error("item index {index} is outside the playlist (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Playlist length.
        len: usize,
    },
    /// The input is not accepted in the current stage.
    #[error("{input} is not accepted while {stage}")]
    WrongStage {
        /// The rejected input.
        input: InputKind,
        /// Stage at the time of the input.
        stage: Stage,
    },
    /// The controller was torn down; only audio outcomes are still accepted.
    #[error("{input} arrived after teardown")]
    TornDown {
        /// The rejected input.
        input: InputKind,
    },
}
