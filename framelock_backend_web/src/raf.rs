// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` tick source.
//!
//! [`AnimationLoop`] calls back once per animation frame with the
//! [`DOMHighResTimeStamp`][mdn] converted to [`HostTime`]. The callback
//! decides whether the loop keeps going: returning [`TickControl::Stop`]
//! ends it until [`start`](AnimationLoop::start) is called again.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use framelock_core::media::TickControl;
use framelock_core::time::HostTime;

// Direct global bindings instead of `web_sys::Window` methods; no Window or
// Performance lookup on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// A `requestAnimationFrame` loop driven by its callback's [`TickControl`].
///
/// Create with [`AnimationLoop::new`], then call [`start`](Self::start). The
/// loop re-registers itself each frame until the callback returns
/// [`TickControl::Stop`], [`stop`](Self::stop) is called, or the loop is
/// dropped.
pub struct AnimationLoop {
    inner: Rc<LoopInner>,
}

type RafClosure = Closure<dyn FnMut(f64)>;

struct LoopInner {
    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Kept apart from `callback` so the closure can re-register itself
    /// while the callback is borrowed.
    closure: RefCell<Option<RafClosure>>,

    callback: RefCell<Box<dyn FnMut(HostTime) -> TickControl>>,

    /// Ticks delivered since creation.
    ticks: Cell<u64>,

    running: Cell<bool>,

    /// ID of the pending `requestAnimationFrame` request.
    raf_id: Cell<i32>,
}

impl AnimationLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(callback: impl FnMut(HostTime) -> TickControl + 'static) -> Self {
        Self {
            inner: Rc::new(LoopInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                ticks: Cell::new(0),
                running: Cell::new(false),
                raf_id: Cell::new(0),
            }),
        }
    }

    /// Requests ticks. A no-op while already running.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        let mut slot = self.inner.closure.borrow_mut();
        let closure = slot.get_or_insert_with(|| {
            // Weak, so the closure stored inside `inner` doesn't keep it alive.
            let inner = Rc::downgrade(&self.inner);
            Closure::wrap(Box::new(move |timestamp_ms: f64| {
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                if !inner.running.get() {
                    return;
                }
                inner.ticks.set(inner.ticks.get() + 1);

                let control = inner.callback.borrow_mut()(HostTime::from_millis_f64(timestamp_ms));

                if control == TickControl::Stop {
                    inner.running.set(false);
                } else if inner.running.get()
                    && let Some(ref closure) = *inner.closure.borrow()
                {
                    let id = request_animation_frame(closure.as_ref().unchecked_ref());
                    inner.raf_id.set(id);
                }
            }) as Box<dyn FnMut(f64)>)
        });

        let id = request_animation_frame(closure.as_ref().unchecked_ref());
        self.inner.raf_id.set(id);
    }

    /// Cancels the pending tick. [`start`](Self::start) resumes.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_animation_frame(self.inner.raf_id.get());
    }

    /// Returns `true` while ticks are requested.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Ticks delivered so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.inner.ticks.get()
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for AnimationLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnimationLoop")
            .field("running", &self.inner.running.get())
            .field("ticks", &self.inner.ticks.get())
            .finish_non_exhaustive()
    }
}
