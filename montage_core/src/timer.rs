// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer tokens.
//!
//! The controller never sleeps. It asks the host to schedule a callback and
//! remembers the [`TimerToken`] it handed out. When the host reports the
//! token back, the controller applies it only if it is still pending; tokens
//! that were cancelled, superseded or outlived a teardown are discarded.

/// What a scheduled timer is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// End of the fade between two playing items.
    TransitionPulse,
    /// Fallback for an embed that never reports "ended".
    EndedWatchdog,
}

impl TimerKind {
    /// Short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransitionPulse => "transition-pulse",
            Self::EndedWatchdog => "ended-watchdog",
        }
    }
}

/// Handle for one scheduled timer. Never reused within a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken {
    /// Monotonic id, unique per controller.
    pub id: u64,
    /// Purpose of the timer.
    pub kind: TimerKind,
}

/// Hands out fresh timer tokens.
#[derive(Clone, Debug, Default)]
pub(crate) struct TokenSource {
    next_id: u64,
}

impl TokenSource {
    pub(crate) fn issue(&mut self, kind: TimerKind) -> TimerToken {
        self.next_id += 1;
        TimerToken {
            id: self.next_id,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        let mut source = TokenSource::default();
        let a = source.issue(TimerKind::TransitionPulse);
        let b = source.issue(TimerKind::TransitionPulse);
        assert_ne!(a, b);
        assert!(a < b, "ids increase");
    }
}
