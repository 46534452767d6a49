// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Birthday surprise: embedded videos played back to back over quiet
//! background music, ending in a gallery of every clip.
//!
//! Replace [`VIDEO_URLS`] with your own YouTube or Vimeo links and put the
//! music file at [`BG_MUSIC_PATH`] next to `index.html`.
//!
//! Build with: `wasm-pack build --target web demos/birthday_surprise`
//! Then serve `demos/birthday_surprise/` and open `index.html`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use montage_backend_web::{
    BackgroundAudio, ConsoleSink, Dispatch, DomTimers, DomView, Presenter as _, WebHost,
};
use montage_core::controller::{Input, PlaybackController, SessionConfig};
use montage_core::playlist::Playlist;
use montage_core::trace::Tracer;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement, PageTransitionEvent};

/// The clips, in playback order.
pub const VIDEO_URLS: &[&str] = &[
    "https://www.youtube.com/embed/Y3TAdQq0TKM?autoplay=1&enablejsapi=1&controls=0&modestbranding=1&rel=0&fs=0&iv_load_policy=3&disablekb=1",
    "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&enablejsapi=1",
];

/// Background track, relative to the page.
pub const BG_MUSIC_PATH: &str = "/assets/bg-music.mp3";

const CONFIG: SessionConfig = SessionConfig::birthday();

struct App {
    controller: PlaybackController,
    host: WebHost,
    view: DomView,
    sink: ConsoleSink,
}

impl App {
    fn handle(&mut self, input: Input) {
        let mut tracer = Tracer::new(&mut self.sink);
        // Refused inputs are already reported by the sink.
        if let Ok(effects) = self.controller.handle(input, &mut tracer) {
            effects.apply(&mut self.host);
        }
        self.view.present(&self.controller.view());
    }
}

/// Entry point for the birthday page.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let body = document.body().ok_or("no body")?;

    let root: HtmlElement = document.create_element("main")?.unchecked_into();
    body.append_child(&root)?;

    // Browser callbacks hold only a weak handle, so the page owns the app.
    let slot: Rc<RefCell<Option<App>>> = Rc::new(RefCell::new(None));
    let dispatch: Dispatch = {
        let slot = Rc::downgrade(&slot);
        Rc::new(move |input: Input| {
            if let Some(slot) = slot.upgrade()
                && let Some(app) = slot.borrow_mut().as_mut()
            {
                app.handle(input);
            }
        })
    };

    let audio = BackgroundAudio::new(BG_MUSIC_PATH, dispatch.clone())?;
    body.append_child(audio.element())?;
    let mut app = App {
        controller: PlaybackController::new(Playlist::new(VIDEO_URLS.iter().copied()), CONFIG),
        host: WebHost {
            audio,
            timers: DomTimers::new(dispatch.clone()),
        },
        view: DomView::new(window.clone(), &root, dispatch.clone(), CONFIG.transition_pulse)?,
        sink: ConsoleSink::new(),
    };
    app.view.present(&app.controller.view());
    *slot.borrow_mut() = Some(app);

    let resize_slot = Rc::downgrade(&slot);
    let on_resize = Closure::wrap(Box::new(move |_event: Event| {
        if let Some(slot) = resize_slot.upgrade()
            && let Some(app) = slot.borrow().as_ref()
        {
            app.view.relayout();
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    let on_page_hide = Closure::wrap(Box::new(move |event: PageTransitionEvent| {
        // A page kept in the back/forward cache may come back; keep it live.
        if !event.persisted() {
            dispatch(Input::Teardown);
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("pagehide", on_page_hide.as_ref().unchecked_ref())?;
    on_page_hide.forget();

    // Keep the app alive: there is no graceful shutdown on the web.
    core::mem::forget(slot);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_core::embed::{self, ProviderFamily};
    use montage_core::gallery::Thumbnail;

    #[test]
    fn every_clip_is_a_known_provider() {
        for url in VIDEO_URLS {
            assert_eq!(ProviderFamily::detect(url), Some(ProviderFamily::YouTube), "{url}");
            let resolved = embed::resolve_playback_url(url);
            assert!(resolved.ends_with(embed::YOUTUBE_PARAMS), "{resolved}");
        }
    }

    #[test]
    fn every_clip_has_a_provider_thumbnail() {
        let controller =
            PlaybackController::new(Playlist::new(VIDEO_URLS.iter().copied()), CONFIG);
        let ids: alloc::vec::Vec<_> = controller
            .tiles()
            .iter()
            .map(|tile| match &tile.thumbnail {
                Thumbnail::Provider { video_id } => video_id.as_str(),
                Thumbnail::Placeholder { .. } => "",
            })
            .collect();
        assert_eq!(ids, ["Y3TAdQq0TKM", "dQw4w9WgXcQ"]);
    }
}
