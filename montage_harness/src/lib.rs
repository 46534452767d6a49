// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic simulated host for montage sessions.
//!
//! [`SimHost`] implements [`Host`] on a virtual millisecond clock: timers are
//! kept in a queue and fire when [`Simulation::advance`] moves the clock past
//! their deadline, and background play requests settle with scripted
//! outcomes. [`Simulation`] wires a controller, a `SimHost` and a
//! [`RecordingPresenter`] together the way a browser page does, so
//! multi-step scenarios can be checked without a browser.

#![no_std]

extern crate alloc;

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;

use montage_core::audio::{AudioCommand, AudioOutcome, AudioRejection};
use montage_core::backend::{Host, Presenter};
use montage_core::controller::{Input, PlaybackController, SessionConfig};
use montage_core::error::CommandError;
use montage_core::playlist::Playlist;
use montage_core::session::{PlaybackTicket, Stage};
use montage_core::time::{Duration, HostTime};
use montage_core::timer::TimerToken;
use montage_core::trace::{NoopSink, TraceSink, Tracer};
use montage_core::view::View;

/// Observable state of the simulated background track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Track {
    /// Last volume set.
    pub volume: f32,
    /// Mute flag.
    pub muted: bool,
    /// `true` once a play request succeeded.
    pub playing: bool,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            playing: false,
        }
    }
}

/// A [`Host`] on a virtual clock.
#[derive(Debug, Default)]
pub struct SimHost {
    now: HostTime,
    timers: BTreeMap<TimerToken, HostTime>,
    track: Track,
    commands: Vec<AudioCommand>,
    script: VecDeque<AudioOutcome>,
    block_autoplay: bool,
    unsettled: VecDeque<AudioOutcome>,
}

impl SimHost {
    /// Creates a host at time zero where every play request succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every unscripted play request with
    /// [`AudioRejection::NotAllowed`].
    pub fn block_autoplay(&mut self, blocked: bool) {
        self.block_autoplay = blocked;
    }

    /// Queues the outcome of the next unscripted play request.
    pub fn script_play(&mut self, outcome: AudioOutcome) {
        self.script.push_back(outcome);
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// The background track.
    #[must_use]
    pub fn track(&self) -> Track {
        self.track
    }

    /// Every audio command received, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[AudioCommand] {
        &self.commands
    }

    /// Pending timers and their deadlines.
    pub fn timers(&self) -> impl Iterator<Item = (TimerToken, HostTime)> + '_ {
        self.timers.iter().map(|(token, deadline)| (*token, *deadline))
    }

    /// Removes and returns the earliest timer due at or before `limit`.
    fn pop_due(&mut self, limit: HostTime) -> Option<(TimerToken, HostTime)> {
        let (token, deadline) = self
            .timers
            .iter()
            .filter(|(_, deadline)| **deadline <= limit)
            .min_by_key(|(token, deadline)| (**deadline, **token))
            .map(|(token, deadline)| (*token, *deadline))?;
        self.timers.remove(&token);
        Some((token, deadline))
    }

    fn next_outcome(&mut self) -> AudioOutcome {
        self.script.pop_front().unwrap_or(if self.block_autoplay {
            AudioOutcome::Rejected(AudioRejection::NotAllowed)
        } else {
            AudioOutcome::Playing
        })
    }
}

impl Host for SimHost {
    fn audio(&mut self, command: AudioCommand) {
        self.commands.push(command);
        match command {
            AudioCommand::SetVolume(volume) => self.track.volume = volume,
            AudioCommand::SetMuted(muted) => self.track.muted = muted,
            AudioCommand::Play => {
                let outcome = self.next_outcome();
                if outcome == AudioOutcome::Playing {
                    self.track.playing = true;
                }
                self.unsettled.push_back(outcome);
            }
        }
    }

    fn schedule(&mut self, token: TimerToken, after: Duration) {
        self.timers.insert(token, self.now + after);
    }

    fn cancel(&mut self, token: TimerToken) {
        self.timers.remove(&token);
    }
}

/// One presented frame, as seen by [`RecordingPresenter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Stage on screen.
    pub stage: Stage,
    /// Ticket of the item on screen, if playing.
    pub ticket: Option<PlaybackTicket>,
    /// Whether the item is fading out.
    pub fading: bool,
    /// Number of gallery tiles, if in the gallery.
    pub tiles: Option<usize>,
}

/// A [`Presenter`] that remembers what it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    frames: Vec<Frame>,
    mounts: usize,
}

impl RecordingPresenter {
    /// Every presented frame, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The most recent frame.
    #[must_use]
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// How many times a new embedded player would have been created.
    #[must_use]
    pub fn mounts(&self) -> usize {
        self.mounts
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, view: &View<'_>) {
        let frame = match view {
            View::Landing(_) => Frame {
                stage: Stage::Landing,
                ticket: None,
                fading: false,
                tiles: None,
            },
            View::Playing(playing) => Frame {
                stage: Stage::Playing,
                ticket: Some(playing.ticket),
                fading: playing.is_transitioning,
                tiles: None,
            },
            View::Gallery(gallery) => Frame {
                stage: Stage::Gallery,
                ticket: None,
                fading: false,
                tiles: Some(gallery.tiles.len()),
            },
        };
        if frame.ticket.is_some() && self.last().and_then(|last| last.ticket) != frame.ticket {
            self.mounts += 1;
        }
        self.frames.push(frame);
    }
}

/// A controller driven by a [`SimHost`], presenting to a
/// [`RecordingPresenter`].
#[derive(Debug)]
pub struct Simulation<S: TraceSink = NoopSink> {
    controller: PlaybackController,
    host: SimHost,
    presenter: RecordingPresenter,
    sink: S,
}

impl Simulation {
    /// Creates a simulation over `urls` without tracing.
    #[must_use]
    pub fn new(urls: &[&str], config: SessionConfig) -> Self {
        Self::with_sink(urls, config, NoopSink)
    }
}

impl<S: TraceSink> Simulation<S> {
    /// Creates a simulation that traces into `sink`.
    #[must_use]
    pub fn with_sink(urls: &[&str], config: SessionConfig, sink: S) -> Self {
        let controller = PlaybackController::new(Playlist::new(urls.iter().copied()), config);
        let mut presenter = RecordingPresenter::default();
        presenter.present(&controller.view());
        Self {
            controller,
            host: SimHost::new(),
            presenter,
            sink,
        }
    }

    /// The controller.
    #[must_use]
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &SimHost {
        &self.host
    }

    /// The host, for scripting audio outcomes.
    pub fn host_mut(&mut self) -> &mut SimHost {
        &mut self.host
    }

    /// The presenter.
    #[must_use]
    pub fn presenter(&self) -> &RecordingPresenter {
        &self.presenter
    }

    /// The trace sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.controller.state().stage()
    }

    /// Current item index, if playing.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.controller.state().current_index()
    }

    /// Delivers one input, applies its effects, settles any play requests
    /// it caused and re-presents.
    pub fn send(&mut self, input: Input) -> Result<(), CommandError> {
        let result = self.dispatch(input);
        while let Some(outcome) = self.host.unsettled.pop_front() {
            // Outcomes only trace; they cannot fail before teardown and are
            // accepted after it.
            let _ = self.dispatch(Input::AudioSettled(outcome));
        }
        self.presenter.present(&self.controller.view());
        result
    }

    fn dispatch(&mut self, input: Input) -> Result<(), CommandError> {
        let mut tracer = Tracer::new(&mut self.sink);
        let effects = self.controller.handle(input, &mut tracer)?;
        effects.apply(&mut self.host);
        Ok(())
    }

    /// Reports "ended" for the item currently on screen.
    ///
    /// Does nothing outside [`Stage::Playing`].
    pub fn finish_current(&mut self) -> Result<(), CommandError> {
        match self.controller.state().ticket() {
            Some(ticket) => self.send(Input::ItemFinished(ticket)),
            None => Ok(()),
        }
    }

    /// Moves the clock forward by `by`, firing due timers in deadline order.
    ///
    /// Timers scheduled by a firing timer also fire if they fall inside the
    /// window. Returns the number of timers fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let end = self.host.now + by;
        let mut fired = 0;
        while let Some((token, deadline)) = self.host.pop_due(end) {
            self.host.now = deadline;
            // Stale tokens are discarded inside the controller, not rejected.
            let _ = self.send(Input::TimerFired(token));
            fired += 1;
        }
        self.host.now = end;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO: [&str; 2] = [
        "https://www.youtube.com/embed/Y3TAdQq0TKM?autoplay=1&enablejsapi=1",
        "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&enablejsapi=1",
    ];

    const PULSE: Duration = Duration::from_millis(600);

    fn sim() -> Simulation {
        Simulation::new(&TWO, SessionConfig::birthday())
    }

    #[test]
    fn two_items_play_back_to_back() {
        let mut sim = sim();
        sim.send(Input::Start).unwrap();
        assert_eq!(sim.current_index(), Some(0));
        assert_eq!(
            sim.host().track(),
            Track {
                volume: 0.2,
                muted: false,
                playing: true,
            }
        );

        sim.finish_current().unwrap();
        assert!(sim.presenter().last().unwrap().fading);
        assert_eq!(sim.advance(Duration::from_millis(599)), 0);
        assert_eq!(sim.current_index(), Some(0), "pulse not over yet");
        assert_eq!(sim.advance(Duration::from_millis(1)), 1);
        assert_eq!(sim.current_index(), Some(1));

        sim.finish_current().unwrap();
        sim.advance(PULSE);
        assert_eq!(sim.stage(), Stage::Gallery);
        assert_eq!(sim.presenter().last().unwrap().tiles, Some(2));
        assert_eq!(sim.presenter().mounts(), 2);
        assert_eq!(sim.host().timers().count(), 0);
    }

    #[test]
    fn empty_playlist_goes_straight_to_gallery() {
        let mut sim = Simulation::new(&[], SessionConfig::birthday());
        sim.send(Input::Start).unwrap();
        assert_eq!(sim.stage(), Stage::Gallery);
        assert!(sim.host().commands().is_empty(), "no audio for an empty show");
        sim.send(Input::Replay).unwrap();
        assert_eq!(sim.stage(), Stage::Gallery);
        assert!(sim.presenter().frames().iter().all(|f| f.stage != Stage::Playing));
    }

    #[test]
    fn blocked_autoplay_keeps_playing_video() {
        let mut sim = sim();
        sim.host_mut().block_autoplay(true);
        sim.send(Input::Start).unwrap();
        assert_eq!(sim.stage(), Stage::Playing);
        assert!(!sim.host().track().playing);

        sim.send(Input::ToggleBackgroundMute).unwrap();
        assert_eq!(
            sim.host().commands().last(),
            Some(&AudioCommand::SetMuted(true))
        );
        assert_eq!(
            sim.host()
                .commands()
                .iter()
                .filter(|c| **c == AudioCommand::Play)
                .count(),
            1,
            "mute toggle must not retry playback"
        );
    }

    #[test]
    fn gallery_pick_resumes_audio() {
        let mut sim = sim();
        sim.host_mut()
            .script_play(AudioOutcome::Rejected(AudioRejection::NotAllowed));
        sim.send(Input::ShowGallery).unwrap();
        sim.send(Input::JumpTo(1)).unwrap();
        assert!(!sim.host().track().playing);
        sim.send(Input::Stop).unwrap();
        sim.send(Input::Replay).unwrap();
        assert!(sim.host().track().playing, "second attempt succeeds");
        assert_eq!(sim.current_index(), Some(0));
    }

    #[test]
    fn skip_during_fade_advances_once() {
        let mut sim = Simulation::new(&["a", "b", "c"], SessionConfig::birthday());
        sim.send(Input::Start).unwrap();
        sim.finish_current().unwrap();
        sim.advance(Duration::from_millis(300));
        sim.send(Input::Skip).unwrap();
        assert_eq!(sim.current_index(), Some(1));
        assert_eq!(sim.advance(PULSE), 0, "cancelled pulse never fires");
        assert_eq!(sim.current_index(), Some(1));
    }

    #[test]
    fn mute_toggle_does_not_remount() {
        let mut sim = sim();
        sim.send(Input::Start).unwrap();
        sim.send(Input::ToggleBackgroundMute).unwrap();
        sim.send(Input::ToggleBackgroundMute).unwrap();
        assert_eq!(sim.presenter().mounts(), 1);
        assert!(!sim.host().track().muted);
        assert_eq!(sim.current_index(), Some(0));
    }

    #[test]
    fn watchdog_drives_silent_embeds() {
        let config = SessionConfig::birthday().with_ended_watchdog(Duration::from_secs(30));
        let mut sim = Simulation::new(&TWO, config);
        sim.send(Input::Start).unwrap();
        sim.advance(Duration::from_secs(30));
        assert_eq!(sim.current_index(), Some(0), "fading, not yet advanced");
        sim.advance(PULSE);
        assert_eq!(sim.current_index(), Some(1));
        sim.advance(Duration::from_secs(30) + PULSE);
        assert_eq!(sim.stage(), Stage::Gallery);
        assert_eq!(sim.host().timers().count(), 0);
    }

    #[test]
    fn teardown_silences_pending_fade() {
        let mut sim = sim();
        sim.send(Input::Start).unwrap();
        sim.finish_current().unwrap();
        sim.send(Input::Teardown).unwrap();
        assert_eq!(sim.host().timers().count(), 0);
        assert_eq!(sim.advance(PULSE), 0);
        assert_eq!(sim.current_index(), Some(0));
        assert!(matches!(
            sim.send(Input::Skip),
            Err(CommandError::TornDown { .. })
        ));
    }
}
