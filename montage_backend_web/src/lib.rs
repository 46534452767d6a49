// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for montage.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`BackgroundAudio`]: the single looping `<audio>` element
//! - [`DomTimers`]: `setTimeout`-backed timers keyed by [`TimerToken`]
//! - [`EmbedBridge`]: `postMessage` listener that reports "ended"
//! - [`DomView`]: renders a [`View`] into a container element
//! - [`ConsoleSink`]: trace sink writing to the browser console
//!
//! [`WebHost`] bundles audio and timers into one
//! [`Host`](montage_core::backend::Host).
//!
//! Every callback the browser makes ends up as a [`Dispatch`] call with an
//! [`Input`]. The application decides how inputs reach its controller.
//!
//! [`TimerToken`]: montage_core::timer::TimerToken
//! [`View`]: montage_core::view::View

#![no_std]

extern crate alloc;

mod audio;
mod console;
mod embed;
mod timer;
mod view;

pub use audio::BackgroundAudio;
pub use console::ConsoleSink;
pub use embed::EmbedBridge;
pub use montage_core::backend::{Host, Presenter};
pub use timer::DomTimers;
pub use view::DomView;

use alloc::rc::Rc;

use montage_core::audio::AudioCommand;
use montage_core::controller::Input;
use montage_core::time::{Duration, HostTime};
use montage_core::timer::TimerToken;
use wasm_bindgen::prelude::*;

// Direct global binding instead of `web_sys::Window` methods, so reading the
// clock never has to fetch (and unwrap) the Window/Performance objects.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;
}

/// Callback that feeds an [`Input`] back to the application.
pub type Dispatch = Rc<dyn Fn(Input)>;

/// Returns the current host time from `performance.now()`, in milliseconds.
#[must_use]
pub fn now() -> HostTime {
    let ms = performance_now();
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns a small positive f64"
    )]
    let ms = ms as u64;
    HostTime(ms)
}

/// The browser [`Host`]: background audio plus timers.
#[derive(Debug)]
pub struct WebHost {
    /// The background track.
    pub audio: BackgroundAudio,
    /// Pending timers.
    pub timers: DomTimers,
}

impl Host for WebHost {
    fn audio(&mut self, command: AudioCommand) {
        self.audio.apply(command);
    }

    fn schedule(&mut self, token: TimerToken, after: Duration) {
        self.timers.schedule(token, after);
    }

    fn cancel(&mut self, token: TimerToken) {
        self.timers.cancel(token);
    }
}
