// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` timers.
//!
//! [`DomTimers`] keeps the JS closure and browser handle of every timer it
//! scheduled, keyed by [`TimerToken`]. A fired timer reports
//! [`Input::TimerFired`] and is pruned on the next [`schedule`] call.
//! Cancelling clears the browser timeout; dropping `DomTimers` clears all of
//! them, so no callback outlives its owner.
//!
//! [`schedule`]: DomTimers::schedule

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::Cell;

use montage_core::controller::Input;
use montage_core::time::Duration;
use montage_core::timer::TimerToken;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::Dispatch;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, millis: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(handle: i32);
}

struct Scheduled {
    /// Handle returned by `setTimeout`.
    handle: i32,
    /// Set by the callback once it ran.
    fired: Rc<Cell<bool>>,
    /// Kept alive until the timer fired or was cancelled.
    _closure: Closure<dyn FnMut()>,
}

/// Browser timers keyed by [`TimerToken`].
pub struct DomTimers {
    pending: BTreeMap<TimerToken, Scheduled>,
    dispatch: Dispatch,
}

impl core::fmt::Debug for DomTimers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomTimers")
            .field("pending", &self.pending.keys())
            .finish_non_exhaustive()
    }
}

impl DomTimers {
    /// Creates an empty timer set reporting through `dispatch`.
    #[must_use]
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            pending: BTreeMap::new(),
            dispatch,
        }
    }

    /// Schedules `token` to be reported after `after`.
    pub fn schedule(&mut self, token: TimerToken, after: Duration) {
        self.pending.retain(|_, scheduled| !scheduled.fired.get());
        self.cancel(token);

        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let dispatch = self.dispatch.clone();
        let closure = Closure::wrap(Box::new(move || {
            flag.set(true);
            dispatch(Input::TimerFired(token));
        }) as Box<dyn FnMut()>);

        let handle = set_timeout(closure.as_ref().unchecked_ref(), after.as_timeout_millis());
        self.pending.insert(
            token,
            Scheduled {
                handle,
                fired,
                _closure: closure,
            },
        );
    }

    /// Clears the timeout for `token`, if it has not fired yet.
    pub fn cancel(&mut self, token: TimerToken) {
        if let Some(scheduled) = self.pending.remove(&token)
            && !scheduled.fired.get()
        {
            clear_timeout(scheduled.handle);
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
            .values()
            .filter(|scheduled| !scheduled.fired.get())
            .count()
    }
}

impl Drop for DomTimers {
    fn drop(&mut self) {
        for scheduled in self.pending.values() {
            if !scheduled.fired.get() {
                clear_timeout(scheduled.handle);
            }
        }
    }
}
