// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! The controller is sans-IO: it turns inputs into [`Effects`] and leaves
//! every side effect to the host. A backend provides the following pieces:
//!
//! - **Host**: implements [`Host`] to drive the background audio element and
//!   to schedule and cancel timers. Timer callbacks come back into the
//!   controller as [`Input::TimerFired`], play outcomes as
//!   [`Input::AudioSettled`].
//!
//! - **Presenter**: implements [`Presenter`] to render a [`View`] into a
//!   platform-native tree (DOM elements in the browser, a recording in tests).
//!
//! - **Embed bridge**: listens for the provider's messages and turns
//!   "ended" into [`Input::ItemFinished`] carrying the ticket captured when
//!   the frame was mounted. This is backend-specific and not abstracted by a
//!   trait because the wiring differs fundamentally across platforms.
//!
//! # Crate boundaries
//!
//! `montage_core` owns the state machine, URL policy, gallery model and this
//! contract module. Backend crates depend on `montage_core` and provide
//! platform glue. Application code depends on both and wires them together.
//!
//! [`Input::TimerFired`]: crate::controller::Input::TimerFired
//! [`Input::AudioSettled`]: crate::controller::Input::AudioSettled
//! [`Input::ItemFinished`]: crate::controller::Input::ItemFinished

use crate::audio::AudioCommand;
use crate::controller::{Effect, Effects};
use crate::time::Duration;
use crate::timer::TimerToken;
use crate::view::View;

/// Carries out controller effects.
pub trait Host {
    /// Applies one audio command. Play requests report back asynchronously.
    fn audio(&mut self, command: AudioCommand);

    /// Arranges for `token` to be reported back after `after`.
    fn schedule(&mut self, token: TimerToken, after: Duration);

    /// Drops a scheduled timer. Unknown tokens are ignored.
    fn cancel(&mut self, token: TimerToken);
}

/// Renders a [`View`] into a platform-native tree.
///
/// # Loop pseudocode
///
/// ```rust,ignore
/// fn on_input(input: Input) {
///     match controller.handle(input, &mut tracer) {
///         Ok(effects) => effects.apply(&mut host),
///         Err(_) => {} // already traced
///     }
///     presenter.present(&controller.view());
/// }
/// ```
pub trait Presenter {
    /// Replaces whatever is on screen with `view`.
    fn present(&mut self, view: &View<'_>);
}

impl Effects {
    /// Hands every effect to `host`, in order.
    pub fn apply(self, host: &mut (impl Host + ?Sized)) {
        for effect in self {
            match effect {
                Effect::Audio(command) => host.audio(command),
                Effect::Schedule { token, after } => host.schedule(token, after),
                Effect::Cancel(token) => host.cancel(token),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::controller::{PlaybackController, SessionConfig};
    use crate::playlist::Playlist;

    #[derive(Default)]
    struct Log {
        audio: Vec<AudioCommand>,
        scheduled: Vec<TimerToken>,
        cancelled: Vec<TimerToken>,
    }

    impl Host for Log {
        fn audio(&mut self, command: AudioCommand) {
            self.audio.push(command);
        }
        fn schedule(&mut self, token: TimerToken, _after: Duration) {
            self.scheduled.push(token);
        }
        fn cancel(&mut self, token: TimerToken) {
            self.cancelled.push(token);
        }
    }

    #[test]
    fn effects_reach_host_in_order() {
        let mut c = PlaybackController::new(
            Playlist::new(["https://youtu.be/dQw4w9WgXcQ"]),
            SessionConfig::birthday(),
        );
        let mut host = Log::default();
        c.start().unwrap().apply(&mut host);
        assert_eq!(
            host.audio,
            [AudioCommand::SetVolume(0.2), AudioCommand::Play]
        );

        let ticket = c.state().ticket().unwrap();
        c.item_finished(ticket).unwrap().apply(&mut host);
        assert_eq!(host.scheduled.len(), 1);

        c.go_home().unwrap().apply(&mut host);
        assert_eq!(host.cancelled, host.scheduled);
    }
}
