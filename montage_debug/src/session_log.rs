// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory session log with JSON export.
//!
//! [`SessionLogSink`] implements [`TraceSink`] and keeps a copy of every
//! event in arrival order. [`SessionLogSink::export_json`] writes the log as
//! a JSON array of objects, one per event, each with a `seq` number and a
//! `kind` discriminator:
//!
//! ```json
//! [
//!   { "seq": 0, "kind": "input", "input": "start", "stage": "landing" },
//!   { "seq": 1, "kind": "stage", "from": "landing", "to": "playing", "item": 0, "epoch": 1 }
//! ]
//! ```

use std::io::{self, Write};

use serde_json::{Value, json};

use montage_core::audio::{AudioCommand, AudioOutcome};
use montage_core::session::Stage;
use montage_core::trace::{
    AudioOutcomeEvent, AudioRequestEvent, DiscardReason, DiscardedEvent, InputEvent,
    RejectedEvent, StageChangeEvent, TimerAction, TimerEvent, TraceSink,
};

/// One recorded event.
#[derive(Clone, Copy, Debug)]
pub enum LoggedEvent {
    /// See [`TraceSink::on_input`].
    Input(InputEvent),
    /// See [`TraceSink::on_stage_change`].
    StageChange(StageChangeEvent),
    /// See [`TraceSink::on_audio_request`].
    AudioRequest(AudioRequestEvent),
    /// See [`TraceSink::on_audio_outcome`].
    AudioOutcome(AudioOutcomeEvent),
    /// See [`TraceSink::on_timer`].
    Timer(TimerEvent),
    /// See [`TraceSink::on_discarded`].
    Discarded(DiscardedEvent),
    /// See [`TraceSink::on_rejected`].
    Rejected(RejectedEvent),
}

/// A [`TraceSink`] that keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct SessionLogSink {
    events: Vec<LoggedEvent>,
}

impl SessionLogSink {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Stages visited, starting with the stage the first recorded input
    /// arrived in. Re-entering the same stage with a new item is not a
    /// separate visit.
    #[must_use]
    pub fn stage_path(&self) -> Vec<Stage> {
        let mut path: Vec<Stage> = Vec::new();
        for event in &self.events {
            let stage = match event {
                LoggedEvent::Input(e) if path.is_empty() => e.stage,
                LoggedEvent::StageChange(e) => e.to,
                _ => continue,
            };
            if path.last() != Some(&stage) {
                path.push(stage);
            }
        }
        path
    }

    /// Number of rejected background play requests.
    #[must_use]
    pub fn audio_rejections(&self) -> usize {
        self.events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    LoggedEvent::AudioOutcome(AudioOutcomeEvent {
                        outcome: AudioOutcome::Rejected(_)
                    })
                )
            })
            .count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Writes the log as a JSON array.
    pub fn export_json(&self, writer: &mut dyn Write) -> io::Result<()> {
        let events: Vec<Value> = self
            .events
            .iter()
            .enumerate()
            .map(|(seq, event)| {
                let mut value = event_json(event);
                if let Value::Object(map) = &mut value {
                    map.insert("seq".to_owned(), json!(seq));
                }
                value
            })
            .collect();
        serde_json::to_writer_pretty(&mut *writer, &events)?;
        writeln!(writer)
    }
}

fn event_json(event: &LoggedEvent) -> Value {
    match *event {
        LoggedEvent::Input(e) => json!({
            "kind": "input",
            "input": e.input.as_str(),
            "stage": e.stage.as_str(),
        }),
        LoggedEvent::StageChange(e) => json!({
            "kind": "stage",
            "from": e.from.as_str(),
            "to": e.to.as_str(),
            "item": e.ticket.map(|ticket| ticket.index),
            "epoch": e.ticket.map(|ticket| ticket.epoch),
        }),
        LoggedEvent::AudioRequest(e) => match e.command {
            AudioCommand::SetVolume(volume) => json!({
                "kind": "audio",
                "command": "volume",
                "volume": volume,
            }),
            AudioCommand::Play => json!({ "kind": "audio", "command": "play" }),
            AudioCommand::SetMuted(muted) => json!({
                "kind": "audio",
                "command": "mute",
                "muted": muted,
            }),
        },
        LoggedEvent::AudioOutcome(e) => match e.outcome {
            AudioOutcome::Playing => json!({ "kind": "audio-settled", "playing": true }),
            AudioOutcome::Rejected(reason) => json!({
                "kind": "audio-settled",
                "playing": false,
                "reason": reason.as_str(),
            }),
        },
        LoggedEvent::Timer(e) => {
            let (action, after) = match e.action {
                TimerAction::Scheduled { after } => ("scheduled", Some(after.millis())),
                TimerAction::Cancelled => ("cancelled", None),
                TimerAction::Fired => ("fired", None),
            };
            json!({
                "kind": "timer",
                "timer": e.token.kind.as_str(),
                "id": e.token.id,
                "action": action,
                "after_ms": after,
            })
        }
        LoggedEvent::Discarded(e) => {
            let reason = match e.reason {
                DiscardReason::StaleTicket(_) => "stale-ticket",
                DiscardReason::StaleTimer(_) => "stale-timer",
                DiscardReason::PulsePending => "pulse-pending",
                DiscardReason::AfterTeardown => "after-teardown",
            };
            json!({
                "kind": "discarded",
                "input": e.input.as_str(),
                "reason": reason,
            })
        }
        LoggedEvent::Rejected(e) => json!({
            "kind": "rejected",
            "error": e.error.to_string(),
        }),
    }
}

impl TraceSink for SessionLogSink {
    fn on_input(&mut self, e: &InputEvent) {
        self.events.push(LoggedEvent::Input(*e));
    }

    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        self.events.push(LoggedEvent::StageChange(*e));
    }

    fn on_audio_request(&mut self, e: &AudioRequestEvent) {
        self.events.push(LoggedEvent::AudioRequest(*e));
    }

    fn on_audio_outcome(&mut self, e: &AudioOutcomeEvent) {
        self.events.push(LoggedEvent::AudioOutcome(*e));
    }

    fn on_timer(&mut self, e: &TimerEvent) {
        self.events.push(LoggedEvent::Timer(*e));
    }

    fn on_discarded(&mut self, e: &DiscardedEvent) {
        self.events.push(LoggedEvent::Discarded(*e));
    }

    fn on_rejected(&mut self, e: &RejectedEvent) {
        self.events.push(LoggedEvent::Rejected(*e));
    }
}
