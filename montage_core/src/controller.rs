// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playback controller: the only writer of [`SessionState`].
//!
//! Every user action and host callback is an [`Input`]. The controller
//! applies it to the session and returns the [`Effects`] the host must carry
//! out: background audio commands and timer schedule/cancel requests. The
//! controller itself never blocks and never talks to the host directly.
//!
//! # Transitions
//!
//! ```text
//!   Landing ──start──► Playing(0) ──ended/skip──► Playing(i+1) ─ … ─► Gallery
//!      │                  │                                            │
//!      └──view all──► Gallery ◄──stop───┘           Playing(j) ◄──pick j / replay
//!
//!   any ──go home──► Landing
//! ```
//!
//! "Ended" does not advance immediately: it raises the transition flag and
//! schedules a [`TimerKind::TransitionPulse`]. The advance happens when the
//! host reports that exact token back. Any input that leaves the item first
//! cancels the pulse, so the late timer is discarded.

use alloc::vec::Vec;
use core::fmt;

use crate::audio::{AudioCommand, AudioOutcome};
use crate::error::CommandError;
use crate::gallery::{self, Tile};
use crate::playlist::Playlist;
use crate::session::{Advance, PlaybackTicket, SessionState, Stage};
use crate::time::Duration;
use crate::timer::{TimerKind, TimerToken, TokenSource};
use crate::trace::{
    AudioOutcomeEvent, AudioRequestEvent, DiscardReason, DiscardedEvent, InputEvent,
    RejectedEvent, StageChangeEvent, TimerAction, TimerEvent, Tracer,
};

/// Session tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Volume applied to the background track on start, `0.0..=1.0`.
    pub background_volume: f32,
    /// Length of the fade between two items after one ends.
    pub transition_pulse: Duration,
    /// If set, an item that has not reported "ended" after this long is
    /// treated as ended.
    pub ended_watchdog: Option<Duration>,
}

impl SessionConfig {
    /// Quiet background track, 600 ms fades, no watchdog.
    #[must_use]
    pub const fn birthday() -> Self {
        Self {
            background_volume: 0.2,
            transition_pulse: Duration::from_millis(600),
            ended_watchdog: None,
        }
    }

    /// Returns this configuration with an ended watchdog.
    #[must_use]
    pub const fn with_ended_watchdog(mut self, after: Duration) -> Self {
        self.ended_watchdog = Some(after);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::birthday()
    }
}

/// Something that happened to the session: a user action or a host callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    /// Landing's play button.
    Start,
    /// Landing's "view all" button.
    ShowGallery,
    /// The embed reported that the item behind `ticket` ended.
    ItemFinished(PlaybackTicket),
    /// Skip to the next item now.
    Skip,
    /// Abandon the sequence and show the gallery.
    Stop,
    /// A gallery tile was picked.
    JumpTo(usize),
    /// Play the sequence again from the first item.
    Replay,
    /// Back to the landing screen.
    GoHome,
    /// Flip background mute.
    ToggleBackgroundMute,
    /// A scheduled timer fired.
    TimerFired(TimerToken),
    /// A background play request settled.
    AudioSettled(AudioOutcome),
    /// The page is going away; cancel everything pending.
    Teardown,
}

/// Fieldless discriminant of [`Input`], for logs and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// [`Input::Start`].
    Start,
    /// [`Input::ShowGallery`].
    ShowGallery,
    /// [`Input::ItemFinished`].
    ItemFinished,
    /// [`Input::Skip`].
    Skip,
    /// [`Input::Stop`].
    Stop,
    /// [`Input::JumpTo`].
    JumpTo,
    /// [`Input::Replay`].
    Replay,
    /// [`Input::GoHome`].
    GoHome,
    /// [`Input::ToggleBackgroundMute`].
    ToggleBackgroundMute,
    /// [`Input::TimerFired`].
    TimerFired,
    /// [`Input::AudioSettled`].
    AudioSettled,
    /// [`Input::Teardown`].
    Teardown,
}

impl InputKind {
    /// Short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ShowGallery => "show-gallery",
            Self::ItemFinished => "item-finished",
            Self::Skip => "skip",
            Self::Stop => "stop",
            Self::JumpTo => "jump-to",
            Self::Replay => "replay",
            Self::GoHome => "go-home",
            Self::ToggleBackgroundMute => "toggle-mute",
            Self::TimerFired => "timer-fired",
            Self::AudioSettled => "audio-settled",
            Self::Teardown => "teardown",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Input {
    /// Returns the discriminant.
    #[must_use]
    pub const fn kind(&self) -> InputKind {
        match self {
            Self::Start => InputKind::Start,
            Self::ShowGallery => InputKind::ShowGallery,
            Self::ItemFinished(_) => InputKind::ItemFinished,
            Self::Skip => InputKind::Skip,
            Self::Stop => InputKind::Stop,
            Self::JumpTo(_) => InputKind::JumpTo,
            Self::Replay => InputKind::Replay,
            Self::GoHome => InputKind::GoHome,
            Self::ToggleBackgroundMute => InputKind::ToggleBackgroundMute,
            Self::TimerFired(_) => InputKind::TimerFired,
            Self::AudioSettled(_) => InputKind::AudioSettled,
            Self::Teardown => InputKind::Teardown,
        }
    }
}

/// One request for the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Drive the background audio element.
    Audio(AudioCommand),
    /// Call back with [`Input::TimerFired`]`(token)` after `after`.
    Schedule {
        /// Token to report back.
        token: TimerToken,
        /// Delay.
        after: Duration,
    },
    /// Drop a previously scheduled timer.
    Cancel(TimerToken),
}

/// Ordered host requests produced by one input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Effects(Vec<Effect>);

impl Effects {
    /// No requests.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The requests, in the order they must be applied.
    #[must_use]
    pub fn as_slice(&self) -> &[Effect] {
        &self.0
    }

    fn push(&mut self, effect: Effect) {
        self.0.push(effect);
    }
}

impl IntoIterator for Effects {
    type Item = Effect;
    type IntoIter = alloc::vec::IntoIter<Effect>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A timer the controller is waiting for, and the item it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    token: TimerToken,
    ticket: PlaybackTicket,
}

/// Owns the playlist and session, and turns inputs into state changes plus
/// host effects.
#[derive(Debug)]
pub struct PlaybackController {
    playlist: Playlist,
    tiles: Vec<Tile>,
    config: SessionConfig,
    state: SessionState,
    tokens: TokenSource,
    pulse: Option<Pending>,
    watchdog: Option<Pending>,
    torn_down: bool,
}

impl PlaybackController {
    /// Creates a controller on the landing stage.
    #[must_use]
    pub fn new(playlist: Playlist, config: SessionConfig) -> Self {
        let tiles = gallery::tiles(&playlist);
        let state = SessionState::new(playlist.len());
        Self {
            playlist,
            tiles,
            config,
            state,
            tokens: TokenSource::default(),
            pulse: None,
            watchdog: None,
            torn_down: false,
        }
    }

    /// The fixed playlist.
    #[must_use]
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Gallery tiles, computed once from the playlist.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Tokens of every timer the controller is still waiting for.
    pub fn pending_timers(&self) -> impl Iterator<Item = TimerToken> + '_ {
        self.pulse
            .iter()
            .chain(self.watchdog.iter())
            .map(|pending| pending.token)
    }

    /// Returns `true` once [`Input::Teardown`] was handled.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Applies one input.
    ///
    /// On error the session is unchanged and no effects are produced.
    pub fn handle(
        &mut self,
        input: Input,
        tracer: &mut Tracer<'_>,
    ) -> Result<Effects, CommandError> {
        let kind = input.kind();
        let from = self.state.stage();
        let before = self.state.ticket();
        tracer.input(&InputEvent { input: kind, stage: from });

        let mut effects = Effects::new();
        let result = self.apply(input, &mut effects, tracer);
        if let Err(error) = result {
            tracer.rejected(&RejectedEvent { error });
            return Err(error);
        }

        let to = self.state.stage();
        let after = self.state.ticket();
        if from != to || before != after {
            tracer.stage_change(&StageChangeEvent {
                from,
                to,
                ticket: after,
            });
        }
        for effect in effects.as_slice() {
            match *effect {
                Effect::Audio(command) => tracer.audio_request(&AudioRequestEvent { command }),
                Effect::Schedule { token, after } => tracer.timer(&TimerEvent {
                    token,
                    action: TimerAction::Scheduled { after },
                }),
                Effect::Cancel(token) => tracer.timer(&TimerEvent {
                    token,
                    action: TimerAction::Cancelled,
                }),
            }
        }
        Ok(effects)
    }

    fn apply(
        &mut self,
        input: Input,
        effects: &mut Effects,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), CommandError> {
        let kind = input.kind();
        if self.torn_down {
            match input {
                Input::TimerFired(_) => {
                    tracer.discarded(&DiscardedEvent {
                        input: kind,
                        reason: DiscardReason::AfterTeardown,
                    });
                    return Ok(());
                }
                Input::AudioSettled(_) | Input::Teardown => {}
                _ => return Err(CommandError::TornDown { input: kind }),
            }
        }

        match input {
            Input::Start => {
                self.require(Stage::Landing, kind)?;
                if self.playlist.is_empty() {
                    self.state.enter_gallery();
                    return Ok(());
                }
                effects.push(Effect::Audio(AudioCommand::SetVolume(
                    self.config.background_volume,
                )));
                effects.push(Effect::Audio(AudioCommand::Play));
                self.enter_item(0, effects)
            }
            Input::ShowGallery => {
                self.require(Stage::Landing, kind)?;
                self.state.enter_gallery();
                Ok(())
            }
            Input::ItemFinished(ticket) => {
                self.begin_pulse(ticket, kind, effects, tracer);
                Ok(())
            }
            Input::Skip => {
                self.require(Stage::Playing, kind)?;
                self.cancel_timers(effects);
                self.advance(effects);
                Ok(())
            }
            Input::Stop => {
                self.require(Stage::Playing, kind)?;
                self.cancel_timers(effects);
                self.state.enter_gallery();
                Ok(())
            }
            Input::JumpTo(index) => {
                self.require(Stage::Gallery, kind)?;
                self.jump_checked(index, effects)
            }
            Input::Replay => {
                self.require(Stage::Gallery, kind)?;
                if self.playlist.is_empty() {
                    return Ok(());
                }
                self.jump_checked(0, effects)
            }
            Input::GoHome => {
                self.cancel_timers(effects);
                self.state.enter_landing();
                Ok(())
            }
            Input::ToggleBackgroundMute => {
                let muted = self.state.toggle_muted();
                effects.push(Effect::Audio(AudioCommand::SetMuted(muted)));
                Ok(())
            }
            Input::TimerFired(token) => {
                self.on_timer(token, kind, effects, tracer);
                Ok(())
            }
            Input::AudioSettled(outcome) => {
                tracer.audio_outcome(&AudioOutcomeEvent { outcome });
                Ok(())
            }
            Input::Teardown => {
                self.cancel_timers(effects);
                self.torn_down = true;
                Ok(())
            }
        }
    }

    fn require(&self, stage: Stage, input: InputKind) -> Result<(), CommandError> {
        let current = self.state.stage();
        if current == stage {
            Ok(())
        } else {
            Err(CommandError::WrongStage {
                input,
                stage: current,
            })
        }
    }

    fn jump_checked(&mut self, index: usize, effects: &mut Effects) -> Result<(), CommandError> {
        if index >= self.playlist.len() {
            return Err(CommandError::IndexOutOfRange {
                index,
                len: self.playlist.len(),
            });
        }
        effects.push(Effect::Audio(AudioCommand::Play));
        self.enter_item(index, effects)
    }

    fn enter_item(&mut self, index: usize, effects: &mut Effects) -> Result<(), CommandError> {
        let ticket = self.state.enter_item(index)?;
        self.cancel_timers(effects);
        self.arm_watchdog(ticket, effects);
        Ok(())
    }

    fn advance(&mut self, effects: &mut Effects) {
        if let Advance::Next(ticket) = self.state.advance() {
            self.arm_watchdog(ticket, effects);
        }
    }

    fn arm_watchdog(&mut self, ticket: PlaybackTicket, effects: &mut Effects) {
        if let Some(after) = self.config.ended_watchdog {
            let token = self.tokens.issue(TimerKind::EndedWatchdog);
            self.watchdog = Some(Pending { token, ticket });
            effects.push(Effect::Schedule { token, after });
        }
    }

    fn cancel_timers(&mut self, effects: &mut Effects) {
        for pending in [self.pulse.take(), self.watchdog.take()].into_iter().flatten() {
            effects.push(Effect::Cancel(pending.token));
        }
        self.state.set_transitioning(false);
    }

    /// Starts the fade that ends `ticket`'s item, unless the report is stale.
    fn begin_pulse(
        &mut self,
        ticket: PlaybackTicket,
        input: InputKind,
        effects: &mut Effects,
        tracer: &mut Tracer<'_>,
    ) {
        if self.state.ticket() != Some(ticket) {
            tracer.discarded(&DiscardedEvent {
                input,
                reason: DiscardReason::StaleTicket(ticket),
            });
            return;
        }
        if self.pulse.is_some() {
            tracer.discarded(&DiscardedEvent {
                input,
                reason: DiscardReason::PulsePending,
            });
            return;
        }
        if let Some(watchdog) = self.watchdog.take() {
            effects.push(Effect::Cancel(watchdog.token));
        }
        let token = self.tokens.issue(TimerKind::TransitionPulse);
        self.pulse = Some(Pending { token, ticket });
        self.state.set_transitioning(true);
        effects.push(Effect::Schedule {
            token,
            after: self.config.transition_pulse,
        });
    }

    fn on_timer(
        &mut self,
        token: TimerToken,
        input: InputKind,
        effects: &mut Effects,
        tracer: &mut Tracer<'_>,
    ) {
        let slot = match token.kind {
            TimerKind::TransitionPulse => &mut self.pulse,
            TimerKind::EndedWatchdog => &mut self.watchdog,
        };
        let Some(pending) = slot.take_if(|pending| pending.token == token) else {
            tracer.discarded(&DiscardedEvent {
                input,
                reason: DiscardReason::StaleTimer(token),
            });
            return;
        };
        tracer.timer(&TimerEvent {
            token,
            action: TimerAction::Fired,
        });
        match token.kind {
            TimerKind::TransitionPulse => {
                self.state.set_transitioning(false);
                self.advance(effects);
            }
            TimerKind::EndedWatchdog => {
                self.begin_pulse(pending.ticket, input, effects, tracer);
            }
        }
    }

    /// Landing's play button.
    pub fn start(&mut self) -> Result<Effects, CommandError> {
        self.handle(Input::Start, &mut Tracer::none())
    }

    /// Landing's "view all" button.
    pub fn show_gallery(&mut self) -> Result<Effects, CommandError> {
        self.handle(Input::ShowGallery, &mut Tracer::none())
    }

    /// The embed behind `ticket` reported "ended".
    pub fn item_finished(&mut self, ticket: PlaybackTicket) -> Result<Effects, CommandError> {
        self.handle(Input::ItemFinished(ticket), &mut Tracer::none())
    }

    /// Skip to the next item without a fade.
    pub fn skip(&mut self) -> Result<Effects, CommandError> {
        self.handle(Input::Skip, &mut Tracer::none())
    }

    /// End the sequence and show the gallery.
    pub fn stop(&mut self) -> Result<Effects, CommandError> {
        self.handle(Input::Stop, &mut Tracer::none())
    }

    /// Play the item at `index` from the gallery.
    pub fn jump_to(&mut self, index: usize) -> Result<Effects, CommandError> {
        self.handle(Input::JumpTo(index), &mut Tracer::none())
    }

    /// Play the sequence again from the first item.
    pub fn replay(&mut self) -> Result<Effects, CommandError> {
        self.handle(Input::Replay, &mut Tracer::none())
    }

    /// Back to the landing screen.
    pub fn go_home(&mut self) -> Result<Effects, CommandError> {
        self.handle(Input::GoHome, &mut Tracer::none())
    }

    /// Flip background mute.
    pub fn toggle_background_mute(&mut self) -> Result<Effects, CommandError> {
        self.handle(Input::ToggleBackgroundMute, &mut Tracer::none())
    }

    /// A scheduled timer fired.
    pub fn timer_fired(&mut self, token: TimerToken) -> Result<Effects, CommandError> {
        self.handle(Input::TimerFired(token), &mut Tracer::none())
    }

    /// A play request settled.
    pub fn audio_settled(&mut self, outcome: AudioOutcome) -> Result<Effects, CommandError> {
        self.handle(Input::AudioSettled(outcome), &mut Tracer::none())
    }

    /// Cancel everything pending; later timer reports are discarded.
    pub fn teardown(&mut self) -> Result<Effects, CommandError> {
        self.handle(Input::Teardown, &mut Tracer::none())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::audio::AudioRejection;

    const TWO: [&str; 2] = [
        "https://www.youtube.com/embed/Y3TAdQq0TKM",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
    ];

    fn controller(urls: &[&str]) -> PlaybackController {
        PlaybackController::new(Playlist::new(urls.iter().copied()), SessionConfig::birthday())
    }

    fn scheduled(effects: &Effects, kind: TimerKind) -> TimerToken {
        effects
            .as_slice()
            .iter()
            .find_map(|effect| match *effect {
                Effect::Schedule { token, .. } if token.kind == kind => Some(token),
                _ => None,
            })
            .expect("no timer of that kind scheduled")
    }

    fn current(c: &PlaybackController) -> PlaybackTicket {
        c.state().ticket().expect("not playing")
    }

    #[test]
    fn two_item_sequence_ends_in_gallery() {
        let mut c = controller(&TWO);

        let effects = c.start().unwrap();
        assert_eq!(
            effects.as_slice(),
            [
                Effect::Audio(AudioCommand::SetVolume(0.2)),
                Effect::Audio(AudioCommand::Play),
            ]
        );
        assert_eq!(c.state().current_index(), Some(0));

        let effects = c.item_finished(current(&c)).unwrap();
        let pulse = scheduled(&effects, TimerKind::TransitionPulse);
        assert_eq!(
            effects.as_slice(),
            [Effect::Schedule {
                token: pulse,
                after: Duration::from_millis(600),
            }]
        );
        assert!(c.state().is_transitioning());
        assert_eq!(c.state().current_index(), Some(0), "advance waits for the pulse");

        assert!(c.timer_fired(pulse).unwrap().is_empty());
        assert_eq!(c.state().current_index(), Some(1));
        assert!(!c.state().is_transitioning());

        let pulse = scheduled(&c.item_finished(current(&c)).unwrap(), TimerKind::TransitionPulse);
        c.timer_fired(pulse).unwrap();
        assert_eq!(c.state().stage(), Stage::Gallery);
        assert!(!c.state().is_transitioning());
        assert_eq!(c.state().current_index(), None);
    }

    #[test]
    fn empty_playlist_never_plays() {
        let mut c = controller(&[]);
        assert!(c.start().unwrap().is_empty(), "no audio for an empty show");
        assert_eq!(c.state().stage(), Stage::Gallery);
        assert!(c.replay().unwrap().is_empty());
        assert_eq!(c.state().stage(), Stage::Gallery);
        assert_eq!(
            c.jump_to(0),
            Err(CommandError::IndexOutOfRange { index: 0, len: 0 })
        );
        assert!(c.tiles().is_empty());
    }

    #[test]
    fn skip_advances_and_finishes() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        assert!(c.skip().unwrap().is_empty());
        assert_eq!(c.state().current_index(), Some(1));
        c.skip().unwrap();
        assert_eq!(c.state().stage(), Stage::Gallery);
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        let first = current(&c);
        c.skip().unwrap();
        let before = c.state().clone();
        assert!(c.item_finished(first).unwrap().is_empty());
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn replayed_item_rejects_previous_ticket() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        let first = current(&c);
        c.stop().unwrap();
        c.replay().unwrap();
        assert_eq!(c.state().current_index(), Some(0));
        assert!(c.item_finished(first).unwrap().is_empty());
        assert!(!c.state().is_transitioning());
    }

    #[test]
    fn second_ended_during_pulse_is_ignored() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        let ticket = current(&c);
        let pulse = scheduled(&c.item_finished(ticket).unwrap(), TimerKind::TransitionPulse);
        assert!(c.item_finished(ticket).unwrap().is_empty());
        c.timer_fired(pulse).unwrap();
        assert_eq!(c.state().current_index(), Some(1), "advanced exactly once");
    }

    #[test]
    fn skip_during_pulse_cancels_it() {
        let mut c = controller(&["a", "b", "c"]);
        c.start().unwrap();
        let pulse = scheduled(&c.item_finished(current(&c)).unwrap(), TimerKind::TransitionPulse);

        let effects = c.skip().unwrap();
        assert_eq!(effects.as_slice(), [Effect::Cancel(pulse)]);
        assert_eq!(c.state().current_index(), Some(1));
        assert!(!c.state().is_transitioning());

        assert!(c.timer_fired(pulse).unwrap().is_empty());
        assert_eq!(c.state().current_index(), Some(1), "late pulse must not advance");
    }

    #[test]
    fn stop_goes_to_gallery() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        let pulse = scheduled(&c.item_finished(current(&c)).unwrap(), TimerKind::TransitionPulse);
        assert_eq!(c.stop().unwrap().as_slice(), [Effect::Cancel(pulse)]);
        assert_eq!(c.state().stage(), Stage::Gallery);
        assert!(!c.state().is_transitioning());
    }

    #[test]
    fn jump_to_plays_picked_item() {
        let mut c = controller(&TWO);
        c.show_gallery().unwrap();
        assert_eq!(
            c.jump_to(1).unwrap().as_slice(),
            [Effect::Audio(AudioCommand::Play)]
        );
        assert_eq!(c.state().current_index(), Some(1));
    }

    #[test]
    fn jump_out_of_range_changes_nothing() {
        let mut c = controller(&TWO);
        c.show_gallery().unwrap();
        let before = c.state().clone();
        assert_eq!(
            c.jump_to(2),
            Err(CommandError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn replay_restarts_from_first_item() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        c.skip().unwrap();
        c.skip().unwrap();
        assert_eq!(
            c.replay().unwrap().as_slice(),
            [Effect::Audio(AudioCommand::Play)]
        );
        assert_eq!(c.state().current_index(), Some(0));
    }

    #[test]
    fn inputs_outside_their_stage_are_rejected() {
        let mut c = controller(&TWO);
        assert_eq!(
            c.skip(),
            Err(CommandError::WrongStage {
                input: InputKind::Skip,
                stage: Stage::Landing,
            })
        );
        assert!(matches!(c.jump_to(0), Err(CommandError::WrongStage { .. })));
        c.start().unwrap();
        assert!(matches!(c.start(), Err(CommandError::WrongStage { .. })));
        assert!(matches!(c.replay(), Err(CommandError::WrongStage { .. })));
        assert_eq!(c.state().current_index(), Some(0));
    }

    #[test]
    fn go_home_from_anywhere() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        c.go_home().unwrap();
        assert_eq!(c.state().stage(), Stage::Landing);
        c.show_gallery().unwrap();
        c.go_home().unwrap();
        assert_eq!(c.state().stage(), Stage::Landing);
    }

    #[test]
    fn double_mute_toggle_is_identity() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        let before = c.state().clone();
        assert_eq!(
            c.toggle_background_mute().unwrap().as_slice(),
            [Effect::Audio(AudioCommand::SetMuted(true))]
        );
        assert!(c.state().background_muted());
        assert_eq!(
            c.toggle_background_mute().unwrap().as_slice(),
            [Effect::Audio(AudioCommand::SetMuted(false))]
        );
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn audio_rejection_changes_nothing() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        let before = c.state().clone();
        let effects = c
            .audio_settled(AudioOutcome::Rejected(AudioRejection::NotAllowed))
            .unwrap();
        assert!(effects.is_empty(), "rejections are not retried");
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn teardown_cancels_and_silences_timers() {
        let mut c = controller(&TWO);
        c.start().unwrap();
        let pulse = scheduled(&c.item_finished(current(&c)).unwrap(), TimerKind::TransitionPulse);

        assert_eq!(c.teardown().unwrap().as_slice(), [Effect::Cancel(pulse)]);
        assert!(c.is_torn_down());
        assert_eq!(c.pending_timers().count(), 0);

        let before = c.state().clone();
        assert!(c.timer_fired(pulse).unwrap().is_empty());
        assert_eq!(c.state(), &before);
        assert_eq!(
            c.skip(),
            Err(CommandError::TornDown {
                input: InputKind::Skip
            })
        );
        assert!(c.audio_settled(AudioOutcome::Playing).is_ok());
    }

    #[test]
    fn watchdog_stands_in_for_missing_ended() {
        let config = SessionConfig::birthday().with_ended_watchdog(Duration::from_secs(90));
        let mut c = PlaybackController::new(Playlist::new(TWO), config);

        let effects = c.start().unwrap();
        let watchdog = scheduled(&effects, TimerKind::EndedWatchdog);
        assert_eq!(
            effects.as_slice()[2],
            Effect::Schedule {
                token: watchdog,
                after: Duration::from_secs(90),
            }
        );

        let pulse = scheduled(&c.timer_fired(watchdog).unwrap(), TimerKind::TransitionPulse);
        assert!(c.state().is_transitioning());
        let effects = c.timer_fired(pulse).unwrap();
        assert_eq!(c.state().current_index(), Some(1));
        let next = scheduled(&effects, TimerKind::EndedWatchdog);
        assert_ne!(next, watchdog);
        assert_eq!(c.pending_timers().collect::<Vec<_>>(), vec![next]);
    }

    #[test]
    fn ended_report_cancels_watchdog() {
        let config = SessionConfig::birthday().with_ended_watchdog(Duration::from_secs(90));
        let mut c = PlaybackController::new(Playlist::new(TWO), config);
        let watchdog = scheduled(&c.start().unwrap(), TimerKind::EndedWatchdog);

        let effects = c.item_finished(current(&c)).unwrap();
        let pulse = scheduled(&effects, TimerKind::TransitionPulse);
        assert_eq!(
            effects.as_slice(),
            [
                Effect::Cancel(watchdog),
                Effect::Schedule {
                    token: pulse,
                    after: Duration::from_millis(600),
                },
            ]
        );
        assert!(c.timer_fired(watchdog).unwrap().is_empty());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn discards_and_rejections_are_traced() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Counts {
            discarded: usize,
            rejected: usize,
            stage_changes: usize,
        }
        impl TraceSink for Counts {
            fn on_discarded(&mut self, _: &DiscardedEvent) {
                self.discarded += 1;
            }
            fn on_rejected(&mut self, _: &RejectedEvent) {
                self.rejected += 1;
            }
            fn on_stage_change(&mut self, _: &StageChangeEvent) {
                self.stage_changes += 1;
            }
        }

        let mut c = controller(&TWO);
        let mut sink = Counts::default();
        let mut tracer = Tracer::new(&mut sink);
        c.handle(Input::Start, &mut tracer).unwrap();
        let first = current(&c);
        c.handle(Input::Skip, &mut tracer).unwrap();
        c.handle(Input::ItemFinished(first), &mut tracer).unwrap();
        c.handle(Input::JumpTo(0), &mut tracer).unwrap_err();
        drop(tracer);

        assert_eq!(sink.stage_changes, 2);
        assert_eq!(sink.discarded, 1);
        assert_eq!(sink.rejected, 1);
    }
}
