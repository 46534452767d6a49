// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace sink.

use alloc::format;
use alloc::string::String;

use montage_core::audio::AudioOutcome;
use montage_core::trace::{
    AudioOutcomeEvent, DiscardedEvent, InputEvent, RejectedEvent, StageChangeEvent, TimerAction,
    TimerEvent, TraceSink,
};
use web_sys::console;

/// Writes controller trace events to the browser console.
///
/// Stage changes go to `console.info`, refused inputs and rejected
/// background playback to `console.warn`. With `verbose` set, inputs, timers
/// and discarded inputs are also written to `console.debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    /// Also log inputs, timers and discards.
    pub verbose: bool,
}

impl ConsoleSink {
    /// A sink that only logs stage changes and warnings.
    #[must_use]
    pub const fn new() -> Self {
        Self { verbose: false }
    }

    /// A sink that logs every event.
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

fn line(message: &str) -> String {
    format!("[montage {:>7}ms] {message}", crate::now().millis())
}

impl TraceSink for ConsoleSink {
    fn on_input(&mut self, e: &InputEvent) {
        if self.verbose {
            console::debug_1(&line(&format!("{} ({})", e.input, e.stage)).into());
        }
    }

    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        let message = match e.ticket {
            Some(ticket) => format!(
                "{} -> {} (item {}, epoch {})",
                e.from, e.to, ticket.index, ticket.epoch
            ),
            None => format!("{} -> {}", e.from, e.to),
        };
        console::info_1(&line(&message).into());
    }

    fn on_audio_outcome(&mut self, e: &AudioOutcomeEvent) {
        match e.outcome {
            AudioOutcome::Playing => {
                if self.verbose {
                    console::debug_1(&line("background audio playing").into());
                }
            }
            AudioOutcome::Rejected(reason) => {
                console::warn_1(&line(&format!("background audio couldn't start: {reason}")).into());
            }
        }
    }

    fn on_timer(&mut self, e: &TimerEvent) {
        if !self.verbose {
            return;
        }
        let action = match e.action {
            TimerAction::Scheduled { after } => format!("scheduled in {}ms", after.millis()),
            TimerAction::Cancelled => String::from("cancelled"),
            TimerAction::Fired => String::from("fired"),
        };
        console::debug_1(
            &line(&format!("timer {} #{} {action}", e.token.kind.as_str(), e.token.id)).into(),
        );
    }

    fn on_discarded(&mut self, e: &DiscardedEvent) {
        if self.verbose {
            console::debug_1(&line(&format!("dropped {}: {:?}", e.input, e.reason)).into());
        }
    }

    fn on_rejected(&mut self, e: &RejectedEvent) {
        console::warn_1(&line(&format!("{}", e.error)).into());
    }
}
