// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Lines are
//! numbered so that interleaved output from several sessions stays readable.

use std::io::Write;

use montage_core::audio::{AudioCommand, AudioOutcome};
use montage_core::trace::{
    AudioOutcomeEvent, AudioRequestEvent, DiscardReason, DiscardedEvent, InputEvent,
    RejectedEvent, StageChangeEvent, TimerAction, TimerEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    line: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, line: 0 }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, line: 0 }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn emit(&mut self, tag: &str, body: std::fmt::Arguments<'_>) {
        self.line += 1;
        let _ = writeln!(self.writer, "{:04} [{tag}] {body}", self.line);
    }
}

fn command_text(command: AudioCommand) -> String {
    match command {
        AudioCommand::SetVolume(volume) => format!("volume={volume:.2}"),
        AudioCommand::Play => "play".to_owned(),
        AudioCommand::SetMuted(muted) => format!("muted={muted}"),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_input(&mut self, e: &InputEvent) {
        self.emit("input", format_args!("{} stage={}", e.input, e.stage));
    }

    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        match e.ticket {
            Some(ticket) => self.emit(
                "stage",
                format_args!(
                    "{} -> {} item={} epoch={}",
                    e.from, e.to, ticket.index, ticket.epoch
                ),
            ),
            None => self.emit("stage", format_args!("{} -> {}", e.from, e.to)),
        }
    }

    fn on_audio_request(&mut self, e: &AudioRequestEvent) {
        self.emit("audio", format_args!("{}", command_text(e.command)));
    }

    fn on_audio_outcome(&mut self, e: &AudioOutcomeEvent) {
        match e.outcome {
            AudioOutcome::Playing => self.emit("audio:settled", format_args!("playing")),
            AudioOutcome::Rejected(reason) => {
                self.emit("audio:settled", format_args!("REJECTED {reason}"));
            }
        }
    }

    fn on_timer(&mut self, e: &TimerEvent) {
        let kind = e.token.kind.as_str();
        let id = e.token.id;
        match e.action {
            TimerAction::Scheduled { after } => self.emit(
                "timer",
                format_args!("{kind}#{id} scheduled in {}ms", after.millis()),
            ),
            TimerAction::Cancelled => self.emit("timer", format_args!("{kind}#{id} cancelled")),
            TimerAction::Fired => self.emit("timer", format_args!("{kind}#{id} fired")),
        }
    }

    fn on_discarded(&mut self, e: &DiscardedEvent) {
        let input = e.input;
        match e.reason {
            DiscardReason::StaleTicket(ticket) => self.emit(
                "drop",
                format_args!(
                    "{input}: stale ticket item={} epoch={}",
                    ticket.index, ticket.epoch
                ),
            ),
            DiscardReason::StaleTimer(token) => self.emit(
                "drop",
                format_args!("{input}: stale timer {}#{}", token.kind.as_str(), token.id),
            ),
            DiscardReason::PulsePending => {
                self.emit("drop", format_args!("{input}: transition already running"));
            }
            DiscardReason::AfterTeardown => {
                self.emit("drop", format_args!("{input}: after teardown"));
            }
        }
    }

    fn on_rejected(&mut self, e: &RejectedEvent) {
        self.emit("reject", format_args!("{}", e.error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_core::audio::AudioRejection;
    use montage_core::controller::InputKind;
    use montage_core::session::{PlaybackTicket, Stage};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn stage_change_line() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_stage_change(&StageChangeEvent {
            from: Stage::Landing,
            to: Stage::Playing,
            ticket: Some(PlaybackTicket { index: 0, epoch: 1 }),
        });
        let output = output(sink);
        assert_eq!(output, "0001 [stage] landing -> playing item=0 epoch=1\n");
    }

    #[test]
    fn rejection_is_loud() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_input(&InputEvent {
            input: InputKind::AudioSettled,
            stage: Stage::Playing,
        });
        sink.on_audio_outcome(&AudioOutcomeEvent {
            outcome: AudioOutcome::Rejected(AudioRejection::NotAllowed),
        });
        let output = output(sink);
        assert!(
            output.contains("0002 [audio:settled] REJECTED not-allowed"),
            "got: {output}"
        );
    }
}
