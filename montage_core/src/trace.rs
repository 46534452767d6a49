// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the session controller.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! controller emits while handling an input. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Rejected background-audio requests are reported here and nowhere else:
//! they are a diagnostic, not an error the page surfaces.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).

use crate::audio::{AudioCommand, AudioOutcome};
use crate::controller::InputKind;
use crate::error::CommandError;
use crate::session::{PlaybackTicket, Stage};
use crate::time::Duration;
use crate::timer::TimerToken;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happened to a timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerAction {
    /// The controller asked the host to schedule it.
    Scheduled {
        /// Delay before it fires.
        after: Duration,
    },
    /// The controller asked the host to cancel it.
    Cancelled,
    /// The host reported it and it was still pending.
    Fired,
}

/// Why an input was dropped without effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    /// An "ended" report for an item that is no longer on screen.
    StaleTicket(PlaybackTicket),
    /// A timer that is no longer pending.
    StaleTimer(TimerToken),
    /// A second "ended" report while the fade is already running.
    PulsePending,
    /// A timer that fired after teardown.
    AfterTeardown,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every input the controller receives.
#[derive(Clone, Copy, Debug)]
pub struct InputEvent {
    /// Which input.
    pub input: InputKind,
    /// Stage when the input arrived.
    pub stage: Stage,
}

/// Emitted when the stage or the item on screen changes.
#[derive(Clone, Copy, Debug)]
pub struct StageChangeEvent {
    /// Stage before the input.
    pub from: Stage,
    /// Stage after the input.
    pub to: Stage,
    /// Ticket of the item now on screen, if playing.
    pub ticket: Option<PlaybackTicket>,
}

/// Emitted for each audio command handed to the host.
#[derive(Clone, Copy, Debug)]
pub struct AudioRequestEvent {
    /// The command.
    pub command: AudioCommand,
}

/// Emitted when the host reports how a play request settled.
#[derive(Clone, Copy, Debug)]
pub struct AudioOutcomeEvent {
    /// The outcome.
    pub outcome: AudioOutcome,
}

/// Emitted for timer scheduling, cancellation and firing.
#[derive(Clone, Copy, Debug)]
pub struct TimerEvent {
    /// The timer.
    pub token: TimerToken,
    /// What happened to it.
    pub action: TimerAction,
}

/// Emitted when an input is dropped as stale.
#[derive(Clone, Copy, Debug)]
pub struct DiscardedEvent {
    /// The dropped input.
    pub input: InputKind,
    /// Why it was dropped.
    pub reason: DiscardReason,
}

/// Emitted when an input is refused with an error.
#[derive(Clone, Copy, Debug)]
pub struct RejectedEvent {
    /// The error returned to the caller.
    pub error: CommandError,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the controller.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an input arrives, before it is applied.
    fn on_input(&mut self, e: &InputEvent) {
        _ = e;
    }

    /// Called after an input changed the stage or the current item.
    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        _ = e;
    }

    /// Called for each audio command issued.
    fn on_audio_request(&mut self, e: &AudioRequestEvent) {
        _ = e;
    }

    /// Called when a play request settles.
    fn on_audio_outcome(&mut self, e: &AudioOutcomeEvent) {
        _ = e;
    }

    /// Called for timer activity.
    fn on_timer(&mut self, e: &TimerEvent) {
        _ = e;
    }

    /// Called when an input is dropped as stale.
    fn on_discarded(&mut self, e: &DiscardedEvent) {
        _ = e;
    }

    /// Called when an input is refused.
    fn on_rejected(&mut self, e: &RejectedEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Generates a `Tracer` method that forwards one event to the sink.
macro_rules! forward {
    ($(#[$doc:meta])* $name:ident => $sink_method:ident($event:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$sink_method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    forward!(
        /// Emits an [`InputEvent`].
        input => on_input(InputEvent)
    );
    forward!(
        /// Emits a [`StageChangeEvent`].
        stage_change => on_stage_change(StageChangeEvent)
    );
    forward!(
        /// Emits an [`AudioRequestEvent`].
        audio_request => on_audio_request(AudioRequestEvent)
    );
    forward!(
        /// Emits an [`AudioOutcomeEvent`].
        audio_outcome => on_audio_outcome(AudioOutcomeEvent)
    );
    forward!(
        /// Emits a [`TimerEvent`].
        timer => on_timer(TimerEvent)
    );
    forward!(
        /// Emits a [`DiscardedEvent`].
        discarded => on_discarded(DiscardedEvent)
    );
    forward!(
        /// Emits a [`RejectedEvent`].
        rejected => on_rejected(RejectedEvent)
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioRejection;

    fn sample_input() -> InputEvent {
        InputEvent {
            input: InputKind::Start,
            stage: Stage::Landing,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_input(&sample_input());
        sink.on_audio_outcome(&AudioOutcomeEvent {
            outcome: AudioOutcome::Rejected(AudioRejection::NotAllowed),
        });
        sink.on_rejected(&RejectedEvent {
            error: CommandError::IndexOutOfRange { index: 3, len: 2 },
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.input(&sample_input());
        tracer.stage_change(&StageChangeEvent {
            from: Stage::Landing,
            to: Stage::Gallery,
            ticket: None,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            inputs: Vec<InputKind>,
        }
        impl TraceSink for RecordingSink {
            fn on_input(&mut self, e: &InputEvent) {
                self.inputs.push(e.input);
            }
        }

        let mut sink = RecordingSink { inputs: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.input(&sample_input());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.inputs, &[InputKind::Start]);
    }
}
