// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM rendering of [`View`]s.
//!
//! [`DomView`] rebuilds its content only when the stage (or, while playing,
//! the ticket) changes. Re-presenting the same item only updates the fade
//! and the mute button, so the embedded player is never reloaded by a mute
//! toggle or by the transition flag.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Size};
use montage_core::backend::Presenter;
use montage_core::controller::Input;
use montage_core::layout::{self, GalleryGrid, TILE_IMAGE_HEIGHT};
use montage_core::session::PlaybackTicket;
use montage_core::time::Duration;
use montage_core::view::{GalleryView, LandingView, PlayingView, View};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, Event, HtmlElement, HtmlIFrameElement, HtmlImageElement, Window};

use crate::{Dispatch, EmbedBridge};

const FALLBACK_VIEWPORT: Size = Size::new(1024.0, 768.0);

const PAGE_CSS: &str = "min-height: 100vh; box-sizing: border-box; padding: 24px; display: flex; align-items: center; justify-content: center; background: linear-gradient(to bottom, #fff1f2, #fefce8, #ecfeff); font-family: system-ui, sans-serif; color: #1f2937;";
const PRIMARY_BUTTON_CSS: &str = "padding: 12px 24px; border: none; border-radius: 9999px; background: linear-gradient(to right, #ec4899, #facc15); color: white; font-weight: 600; font-size: 16px; box-shadow: 0 10px 15px rgba(0,0,0,0.15); cursor: pointer;";
const SECONDARY_BUTTON_CSS: &str = "padding: 8px 16px; border: 1px solid #d1d5db; border-radius: 6px; background: white; color: #374151; font-size: 14px; cursor: pointer;";
const ROUND_BUTTON_CSS: &str = "width: 40px; height: 40px; border: none; border-radius: 9999px; background: rgba(255,255,255,0.8); box-shadow: 0 1px 3px rgba(0,0,0,0.2); font-size: 16px; cursor: pointer;";

type ClickClosure = Closure<dyn FnMut(Event)>;

/// What is currently in the DOM.
enum Shown {
    Nothing,
    Landing,
    Playing {
        ticket: PlaybackTicket,
        stage: HtmlElement,
        fade: HtmlElement,
        mute: HtmlElement,
    },
    Gallery {
        grid: HtmlElement,
        tiles: Vec<HtmlElement>,
    },
}

/// Renders [`View`]s into a container element.
pub struct DomView {
    window: Window,
    document: Document,
    content: HtmlElement,
    dispatch: Dispatch,
    bridge: EmbedBridge,
    fade: Duration,
    shown: Shown,
    listeners: Vec<ClickClosure>,
}

impl core::fmt::Debug for DomView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let shown = match self.shown {
            Shown::Nothing => "nothing",
            Shown::Landing => "landing",
            Shown::Playing { .. } => "playing",
            Shown::Gallery { .. } => "gallery",
        };
        f.debug_struct("DomView")
            .field("shown", &shown)
            .field("listeners", &self.listeners.len())
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}

impl DomView {
    /// Takes over `root`: styles it as the page and renders into a centered
    /// content column. `fade` is the length of the cross-fade between items.
    pub fn new(
        window: Window,
        root: &HtmlElement,
        dispatch: Dispatch,
        fade: Duration,
    ) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        style(root, PAGE_CSS)?;
        let content = element(&document, "div")?;
        style(&content, "width: 100%; max-width: 1024px;")?;
        root.append_child(&content)?;
        let bridge = EmbedBridge::new(window.clone(), dispatch.clone())?;
        Ok(Self {
            window,
            document,
            content,
            dispatch,
            bridge,
            fade,
            shown: Shown::Nothing,
            listeners: Vec::new(),
        })
    }

    /// Reapplies geometry after a viewport change.
    pub fn relayout(&self) {
        let viewport = self.viewport();
        match &self.shown {
            Shown::Playing { stage, .. } => {
                let _ = size(stage, layout::stage_frame(viewport).size());
            }
            Shown::Gallery { grid, tiles } => {
                let _ = place_tiles(grid, tiles, GalleryGrid::for_viewport(viewport));
            }
            Shown::Nothing | Shown::Landing => {}
        }
    }

    fn viewport(&self) -> Size {
        let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64());
        match (
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        ) {
            (Some(width), Some(height)) => Size::new(width, height),
            _ => FALLBACK_VIEWPORT,
        }
    }

    fn reset(&mut self) {
        self.bridge.unmount();
        self.content.set_inner_html("");
        self.listeners.clear();
        self.shown = Shown::Nothing;
    }

    fn on_click(&mut self, target: &HtmlElement, input: Input) -> Result<(), JsValue> {
        let dispatch = self.dispatch.clone();
        let closure = Closure::wrap(Box::new(move |_event: Event| {
            dispatch(input);
        }) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        self.listeners.push(closure);
        Ok(())
    }

    fn button(
        &mut self,
        label: &str,
        title: &str,
        css: &str,
        input: Input,
    ) -> Result<HtmlElement, JsValue> {
        let button = element(&self.document, "button")?;
        button.set_text_content(Some(label));
        button.set_title(title);
        style(&button, css)?;
        self.on_click(&button, input)?;
        Ok(button)
    }

    fn text(&self, tag: &str, text: &str, css: &str) -> Result<HtmlElement, JsValue> {
        let el = element(&self.document, tag)?;
        el.set_text_content(Some(text));
        style(&el, css)?;
        Ok(el)
    }

    fn show_landing(&mut self, _landing: &LandingView) -> Result<(), JsValue> {
        if matches!(self.shown, Shown::Landing) {
            return Ok(());
        }
        self.reset();

        let panel = element(&self.document, "div")?;
        style(&panel, "text-align: center; padding: 80px 0;")?;
        let title = self.text(
            "h1",
            "\u{1f389} Happy Birthday! \u{1f382}",
            "font-size: 48px; font-weight: 800; margin: 0 0 24px;",
        )?;
        panel.append_child(&title)?;
        let blurb = self.text(
            "p",
            "A surprise video montage. Click below to start the show.",
            "font-size: 18px; color: #374151; margin: 0 0 24px;",
        )?;
        panel.append_child(&blurb)?;

        let actions = element(&self.document, "div")?;
        style(
            &actions,
            "display: flex; align-items: center; justify-content: center; gap: 16px;",
        )?;
        let play = self.button(
            "Play Surprise",
            "Play Surprise",
            PRIMARY_BUTTON_CSS,
            Input::Start,
        )?;
        actions.append_child(&play)?;
        let view_all = self.button(
            "View All Videos",
            "View All Videos",
            SECONDARY_BUTTON_CSS,
            Input::ShowGallery,
        )?;
        actions.append_child(&view_all)?;
        panel.append_child(&actions)?;

        let tip = self.text(
            "div",
            "Tip: If you don't hear music, tap the Play button once (browser autoplay rules).",
            "margin-top: 32px; font-size: 14px; color: #4b5563;",
        )?;
        panel.append_child(&tip)?;

        self.content.append_child(&panel)?;
        self.shown = Shown::Landing;
        Ok(())
    }

    fn show_playing(&mut self, playing: &PlayingView<'_>) -> Result<(), JsValue> {
        if let Shown::Playing {
            ticket, fade, mute, ..
        } = &self.shown
            && *ticket == playing.ticket
        {
            set_opacity(fade, playing.opacity())?;
            set_mute_button(mute, playing.background_muted);
            return Ok(());
        }
        self.reset();

        let column = element(&self.document, "div")?;
        style(&column, "display: flex; flex-direction: column; gap: 16px;")?;

        let stage = element(&self.document, "div")?;
        style(
            &stage,
            "position: relative; margin: 0 auto; background: black; border-radius: 8px; overflow: hidden; box-shadow: 0 20px 25px rgba(0,0,0,0.25);",
        )?;
        size(&stage, layout::stage_frame(self.viewport()).size())?;

        let fade = element(&self.document, "div")?;
        style(&fade, &fade_in_css(self.fade))?;

        let frame: HtmlIFrameElement = self.document.create_element("iframe")?.unchecked_into();
        frame.set_src(&playing.embed_url);
        frame.set_title(&playing.title());
        frame.set_attribute("allow", "autoplay; encrypted-media; fullscreen")?;
        frame.set_attribute("allowfullscreen", "")?;
        frame.set_attribute("frameborder", "0")?;
        style(
            &frame,
            "position: absolute; inset: 0; width: 100%; height: 100%; border: 0;",
        )?;
        self.bridge.mount(&frame, playing.family, playing.ticket)?;
        fade.append_child(&frame)?;
        stage.append_child(&fade)?;

        let controls = element(&self.document, "div")?;
        style(
            &controls,
            "position: absolute; top: 12px; right: 12px; display: flex; gap: 8px;",
        )?;
        let skip = self.button(
            "\u{23ed}",
            "Skip to next",
            ROUND_BUTTON_CSS,
            Input::Skip,
        )?;
        controls.append_child(&skip)?;
        let mute = self.button("", "", ROUND_BUTTON_CSS, Input::ToggleBackgroundMute)?;
        set_mute_button(&mute, playing.background_muted);
        controls.append_child(&mute)?;
        let stop = self.button(
            "\u{23f9}",
            "End and go to gallery",
            ROUND_BUTTON_CSS,
            Input::Stop,
        )?;
        controls.append_child(&stop)?;
        stage.append_child(&controls)?;
        column.append_child(&stage)?;

        let caption = element(&self.document, "div")?;
        style(
            &caption,
            "display: flex; align-items: center; justify-content: space-between; font-size: 14px;",
        )?;
        let progress = self.text("div", &playing.progress(), "color: #374151;")?;
        caption.append_child(&progress)?;
        let note = self.text(
            "div",
            "Autoplay sequence: videos will play back-to-back.",
            "color: #6b7280;",
        )?;
        caption.append_child(&note)?;
        column.append_child(&caption)?;

        self.content.append_child(&column)?;
        self.shown = Shown::Playing {
            ticket: playing.ticket,
            stage,
            fade: fade.clone(),
            mute,
        };

        // Flush the transparent start so the change below is animated.
        let _ = fade.offset_width();
        set_opacity(&fade, playing.opacity())
    }

    fn show_gallery(&mut self, gallery: &GalleryView<'_>) -> Result<(), JsValue> {
        if matches!(self.shown, Shown::Gallery { .. }) {
            return Ok(());
        }
        self.reset();

        let panel = element(&self.document, "div")?;
        style(&panel, "padding: 24px 0;")?;

        let header = element(&self.document, "div")?;
        style(
            &header,
            "display: flex; align-items: center; justify-content: space-between; margin-bottom: 16px;",
        )?;
        let heading = self.text(
            "h2",
            "All Messages",
            "font-size: 24px; font-weight: 600; margin: 0;",
        )?;
        header.append_child(&heading)?;
        let actions = element(&self.document, "div")?;
        style(&actions, "display: flex; gap: 8px;")?;
        let replay = self.button(
            "Replay Sequence",
            "Replay Sequence",
            "padding: 8px 16px; border: none; border-radius: 6px; background: #4f46e5; color: white; cursor: pointer;",
            Input::Replay,
        )?;
        actions.append_child(&replay)?;
        let home = self.button(
            "Back Home",
            "Back Home",
            SECONDARY_BUTTON_CSS,
            Input::GoHome,
        )?;
        actions.append_child(&home)?;
        header.append_child(&actions)?;
        panel.append_child(&header)?;

        let grid = element(&self.document, "div")?;
        style(&grid, "position: relative;")?;
        let mut tiles = Vec::with_capacity(gallery.tiles.len());
        for tile in gallery.tiles {
            let card = element(&self.document, "div")?;
            style(
                &card,
                "border-radius: 6px; overflow: hidden; background: white; box-shadow: 0 1px 3px rgba(0,0,0,0.15); cursor: pointer;",
            )?;
            self.on_click(&card, Input::JumpTo(tile.index))?;

            let preview = element(&self.document, "div")?;
            style(&preview, "position: relative;")?;
            let image: HtmlImageElement = self.document.create_element("img")?.unchecked_into();
            image.set_src(&tile.thumbnail_url);
            image.set_alt(&format!("{} thumbnail", tile.label));
            style(
                &image,
                &format!(
                    "display: block; width: 100%; height: {TILE_IMAGE_HEIGHT}px; object-fit: cover;"
                ),
            )?;
            preview.append_child(&image)?;
            let badge = element(&self.document, "div")?;
            style(
                &badge,
                "position: absolute; inset: 0; display: flex; align-items: center; justify-content: center;",
            )?;
            let icon = self.text(
                "div",
                "\u{25b6}",
                "background: rgba(0,0,0,0.4); border-radius: 9999px; padding: 12px; color: white;",
            )?;
            badge.append_child(&icon)?;
            preview.append_child(&badge)?;
            card.append_child(&preview)?;
            let label = self.text("div", &tile.label, "padding: 8px; font-size: 14px;")?;
            card.append_child(&label)?;

            grid.append_child(&card)?;
            tiles.push(card);
        }
        place_tiles(&grid, &tiles, GalleryGrid::for_viewport(self.viewport()))?;
        panel.append_child(&grid)?;

        self.content.append_child(&panel)?;
        self.shown = Shown::Gallery { grid, tiles };
        Ok(())
    }
}

impl Presenter for DomView {
    fn present(&mut self, view: &View<'_>) {
        let result = match view {
            View::Landing(landing) => self.show_landing(landing),
            View::Playing(playing) => self.show_playing(playing),
            View::Gallery(gallery) => self.show_gallery(gallery),
        };
        if let Err(err) = result {
            web_sys::console::error_2(&JsValue::from_str("montage: render failed"), &err);
        }
    }
}

/// Style of a freshly mounted item: transparent, fading in over `fade`.
fn fade_in_css(fade: Duration) -> String {
    format!(
        "position: absolute; inset: 0; transition: opacity {}ms; opacity: 0;",
        fade.millis()
    )
}

fn set_opacity(el: &HtmlElement, opacity: f64) -> Result<(), JsValue> {
    el.style().set_property("opacity", &format!("{opacity}"))
}

fn set_mute_button(button: &HtmlElement, muted: bool) {
    let (icon, title) = if muted {
        ("\u{1f508}", "Unmute background")
    } else {
        ("\u{1f50a}", "Mute background")
    };
    button.set_text_content(Some(icon));
    button.set_title(title);
}

fn place_tiles(
    grid: &HtmlElement,
    tiles: &[HtmlElement],
    columns: GalleryGrid,
) -> Result<(), JsValue> {
    for (index, tile) in tiles.iter().enumerate() {
        place(tile, columns.tile_rect(index))?;
    }
    grid.style()
        .set_property("height", &format!("{}px", columns.content_height(tiles.len())))
}

fn place(el: &HtmlElement, rect: Rect) -> Result<(), JsValue> {
    let s = el.style();
    s.set_property("position", "absolute")?;
    s.set_property("left", &format!("{}px", rect.x0))?;
    s.set_property("top", &format!("{}px", rect.y0))?;
    size(el, rect.size())
}

fn size(el: &HtmlElement, size: Size) -> Result<(), JsValue> {
    let s = el.style();
    s.set_property("width", &format!("{}px", size.width))?;
    s.set_property("height", &format!("{}px", size.height))
}

fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

fn style(el: &web_sys::Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_items_start_transparent() {
        let css = fade_in_css(Duration::from_millis(600));
        assert!(css.contains("transition: opacity 600ms;"), "got: {css}");
        assert!(css.ends_with("opacity: 0;"), "got: {css}");
    }
}
