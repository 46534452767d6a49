// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Embed `postMessage` bridge.
//!
//! Providers announce playback state by posting messages from the iframe to
//! the page. Once a frame has loaded, the bridge posts the provider's
//! subscribe message into it; afterwards every `message` event on the window
//! is checked against the mounted frame (source window and origin) and
//! decoded with [`parse_embed_message`]. An "ended" signal is reported as
//! [`Input::ItemFinished`] with the ticket captured at mount time, so a
//! message from a frame that has since been replaced can never advance a
//! later item.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::{Cell, RefCell};

use montage_core::controller::Input;
use montage_core::embed::{EmbedSignal, ProviderFamily, parse_embed_message};
use montage_core::session::PlaybackTicket;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlIFrameElement, MessageEvent, Window};

use crate::Dispatch;

type MessageClosure = Closure<dyn FnMut(MessageEvent)>;
type LoadClosure = Closure<dyn FnMut(Event)>;

/// Listens for provider messages on behalf of the mounted frame.
pub struct EmbedBridge {
    window: Window,
    inner: Rc<BridgeInner>,
    listener: MessageClosure,
}

struct BridgeInner {
    mount: RefCell<Option<Mount>>,
    dispatch: Dispatch,
    next_listener_id: Cell<u64>,
}

struct Mount {
    frame: HtmlIFrameElement,
    family: ProviderFamily,
    ticket: PlaybackTicket,
    /// Posts the subscribe message once the frame has loaded.
    on_load: LoadClosure,
}

impl Drop for Mount {
    fn drop(&mut self) {
        let _ = self
            .frame
            .remove_event_listener_with_callback("load", self.on_load.as_ref().unchecked_ref());
    }
}

impl core::fmt::Debug for EmbedBridge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mount = self.inner.mount.borrow();
        f.debug_struct("EmbedBridge")
            .field("family", &mount.as_ref().map(|m| m.family))
            .field("ticket", &mount.as_ref().map(|m| m.ticket))
            .finish_non_exhaustive()
    }
}

impl EmbedBridge {
    /// Starts listening for `message` events on `window`.
    pub fn new(window: Window, dispatch: Dispatch) -> Result<Self, JsValue> {
        let inner = Rc::new(BridgeInner {
            mount: RefCell::new(None),
            dispatch,
            next_listener_id: Cell::new(1),
        });
        let listener_inner = Rc::clone(&inner);
        let listener = Closure::wrap(Box::new(move |event: MessageEvent| {
            listener_inner.on_message(&event);
        }) as Box<dyn FnMut(MessageEvent)>);
        window.add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())?;
        Ok(Self {
            window,
            inner,
            listener,
        })
    }

    /// Watches `frame` for the item behind `ticket`.
    ///
    /// Frames from unrecognized providers cannot report "ended"; mounting one
    /// only forgets the previous frame.
    pub fn mount(
        &self,
        frame: &HtmlIFrameElement,
        family: Option<ProviderFamily>,
        ticket: PlaybackTicket,
    ) -> Result<(), JsValue> {
        self.unmount();
        let Some(family) = family else {
            return Ok(());
        };

        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        let subscribe = JsValue::from_str(&family.subscribe_message(id));
        let target = frame.clone();
        let on_load = Closure::wrap(Box::new(move |_event: Event| {
            if let Some(content) = target.content_window() {
                let _ = content.post_message(&subscribe, "*");
            }
        }) as Box<dyn FnMut(Event)>);
        frame.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;

        *self.inner.mount.borrow_mut() = Some(Mount {
            frame: frame.clone(),
            family,
            ticket,
            on_load,
        });
        Ok(())
    }

    /// Stops watching the current frame.
    pub fn unmount(&self) {
        self.inner.mount.borrow_mut().take();
    }
}

impl Drop for EmbedBridge {
    fn drop(&mut self) {
        self.unmount();
        let _ = self
            .window
            .remove_event_listener_with_callback("message", self.listener.as_ref().unchecked_ref());
    }
}

impl BridgeInner {
    fn on_message(&self, event: &MessageEvent) {
        // The borrow must end before dispatching: the application re-renders
        // and remounts from inside the dispatch.
        let target = {
            let mount = self.mount.borrow();
            mount
                .as_ref()
                .filter(|mount| is_from(mount, event))
                .map(|mount| (mount.family, mount.ticket))
        };
        let Some((family, ticket)) = target else {
            return;
        };
        let Some(data) = message_text(&event.data()) else {
            return;
        };
        if parse_embed_message(family, &data) == Some(EmbedSignal::Ended) {
            (self.dispatch)(Input::ItemFinished(ticket));
        }
    }
}

fn is_from(mount: &Mount, event: &MessageEvent) -> bool {
    if !mount.family.accepts_origin(&event.origin()) {
        return false;
    }
    match (event.source(), mount.frame.content_window()) {
        (Some(source), Some(content)) => js_sys::Object::is(&source, &content),
        _ => false,
    }
}

/// Providers post either JSON text or structured-clone objects.
fn message_text(data: &JsValue) -> Option<String> {
    if let Some(text) = data.as_string() {
        return Some(text);
    }
    if data.is_object() {
        return js_sys::JSON::stringify(data).ok().map(String::from);
    }
    None
}
