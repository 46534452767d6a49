// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The background `<audio>` element.
//!
//! One element is created per page and never recreated. `play()` returns a
//! promise that browsers reject when autoplay is not allowed; the outcome is
//! awaited on a `spawn_local` task and reported back as
//! [`Input::AudioSettled`], never retried.

use montage_core::audio::{AudioCommand, AudioOutcome, AudioRejection};
use montage_core::controller::Input;
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, HtmlAudioElement};

use crate::Dispatch;

/// Owns the looping background track.
pub struct BackgroundAudio {
    element: HtmlAudioElement,
    dispatch: Dispatch,
}

impl core::fmt::Debug for BackgroundAudio {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackgroundAudio")
            .field("src", &self.element.src())
            .field("muted", &self.element.muted())
            .finish_non_exhaustive()
    }
}

impl BackgroundAudio {
    /// Creates the looping, preloaded element for `src`.
    ///
    /// The element is not attached to the document; call
    /// [`element`](Self::element) to place it if the page wants it visible.
    pub fn new(src: &str, dispatch: Dispatch) -> Result<Self, JsValue> {
        let element = HtmlAudioElement::new_with_src(src)?;
        element.set_loop(true);
        element.set_preload("auto");
        Ok(Self { element, dispatch })
    }

    /// The underlying element.
    #[must_use]
    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }

    /// Applies one command.
    pub fn apply(&self, command: AudioCommand) {
        match command {
            AudioCommand::SetVolume(volume) => {
                self.element.set_volume(f64::from(volume.clamp(0.0, 1.0)));
            }
            AudioCommand::SetMuted(muted) => self.element.set_muted(muted),
            AudioCommand::Play => self.play(),
        }
    }

    fn play(&self) {
        // Even a synchronous failure is reported from the task, so the
        // outcome never re-enters the caller.
        let request = self.element.play().map(JsFuture::from);
        let dispatch = self.dispatch.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = match request {
                Ok(future) => future.await,
                Err(err) => Err(err),
            };
            let outcome = match result {
                Ok(_) => AudioOutcome::Playing,
                Err(err) => AudioOutcome::Rejected(rejection(&err)),
            };
            dispatch(Input::AudioSettled(outcome));
        });
    }
}

fn rejection(err: &JsValue) -> AudioRejection {
    err.dyn_ref::<DomException>()
        .map_or(AudioRejection::Other, |exception| {
            AudioRejection::from_exception_name(&exception.name())
        })
}
