// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<video>` and `<input type=range>` collaborators.

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::Rect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlInputElement, HtmlVideoElement};

use framelock_core::media::{MediaElement, SeekBar};

/// An `HTMLVideoElement` as a [`MediaElement`].
pub struct VideoElement {
    video: HtmlVideoElement,
    /// Reused for every `play()` promise; a rejection (autoplay policy,
    /// interrupted load) is logged, not raised.
    on_play_rejected: Closure<dyn FnMut(JsValue)>,
}

impl VideoElement {
    /// Wraps `video`.
    #[must_use]
    pub fn new(video: HtmlVideoElement) -> Self {
        let on_play_rejected = Closure::wrap(Box::new(|err: JsValue| {
            log::warn!("video play() rejected: {err:?}");
        }) as Box<dyn FnMut(JsValue)>);
        Self {
            video,
            on_play_rejected,
        }
    }

    /// The underlying element.
    #[must_use]
    pub fn element(&self) -> &HtmlVideoElement {
        &self.video
    }
}

impl MediaElement for VideoElement {
    fn duration(&self) -> f64 {
        self.video.duration()
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn set_current_time(&mut self, time: f64) {
        self.video.set_current_time(time);
    }

    fn paused(&self) -> bool {
        self.video.paused()
    }

    fn ended(&self) -> bool {
        self.video.ended()
    }

    fn seeking(&self) -> bool {
        self.video.seeking()
    }

    fn play(&mut self) {
        match self.video.play() {
            Ok(promise) => {
                _ = promise.catch(&self.on_play_rejected);
            }
            Err(err) => log::warn!("video play() threw: {err:?}"),
        }
    }

    fn pause(&mut self) {
        if let Err(err) = self.video.pause() {
            log::warn!("video pause() threw: {err:?}");
        }
    }

    fn source(&self) -> String {
        // `src` keeps the fragment as written; `currentSrc` covers <source>
        // children.
        let src = self.video.src();
        if src.is_empty() {
            self.video.current_src()
        } else {
            src
        }
    }

    fn set_poster(&mut self, url: &str) {
        self.video.set_poster(url);
    }

    fn remove(&mut self) {
        self.video.remove();
    }
}

impl core::fmt::Debug for VideoElement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoElement")
            .field("video", &"HtmlVideoElement")
            .finish_non_exhaustive()
    }
}

/// An `<input type=range>` as a [`SeekBar`].
#[derive(Clone)]
pub struct SeekInput {
    input: HtmlInputElement,
}

impl SeekInput {
    /// Wraps `input`.
    #[must_use]
    pub fn new(input: HtmlInputElement) -> Self {
        Self { input }
    }

    /// The underlying element.
    #[must_use]
    pub fn element(&self) -> &HtmlInputElement {
        &self.input
    }

    /// Client-space bounds, matching `MouseEvent.clientX/Y`.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let r = self.input.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }
}

impl SeekBar for SeekInput {
    fn value(&self) -> f64 {
        let value = self.input.value_as_number();
        if value.is_finite() { value } else { 0.0 }
    }

    fn set_value(&mut self, value: f64) {
        self.input.set_value_as_number(value);
    }
}

impl core::fmt::Debug for SeekInput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeekInput")
            .field("input", &"HtmlInputElement")
            .finish()
    }
}
