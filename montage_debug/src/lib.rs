// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON session logs for montage diagnostics.
//!
//! This crate provides [`TraceSink`](montage_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`session_log::SessionLogSink`]: keeps every event in memory and
//!   exports the session as JSON.
//! - [`Tee`]: forwards each event to two sinks.

pub mod pretty;
pub mod session_log;

use montage_core::trace::{
    AudioOutcomeEvent, AudioRequestEvent, DiscardedEvent, InputEvent, RejectedEvent,
    StageChangeEvent, TimerEvent, TraceSink,
};

/// Forwards every event to both sinks, `A` first.
#[derive(Debug, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_input(&mut self, e: &InputEvent) {
        self.0.on_input(e);
        self.1.on_input(e);
    }

    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        self.0.on_stage_change(e);
        self.1.on_stage_change(e);
    }

    fn on_audio_request(&mut self, e: &AudioRequestEvent) {
        self.0.on_audio_request(e);
        self.1.on_audio_request(e);
    }

    fn on_audio_outcome(&mut self, e: &AudioOutcomeEvent) {
        self.0.on_audio_outcome(e);
        self.1.on_audio_outcome(e);
    }

    fn on_timer(&mut self, e: &TimerEvent) {
        self.0.on_timer(e);
        self.1.on_timer(e);
    }

    fn on_discarded(&mut self, e: &DiscardedEvent) {
        self.0.on_discarded(e);
        self.1.on_discarded(e);
    }

    fn on_rejected(&mut self, e: &RejectedEvent) {
        self.0.on_rejected(e);
        self.1.on_rejected(e);
    }
}
