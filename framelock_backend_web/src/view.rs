// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM player view.
//!
//! [`DomView`] writes frame and time labels into text elements, toggles the
//! play button and the control strip, and forwards overlay work to an
//! optional [`OverlayRenderer`].

use alloc::boxed::Box;

use kurbo::Rect;
use web_sys::HtmlElement;

use framelock_core::media::{FrameDisplay, PlayerView};

/// Per-frame annotation drawn over the video.
pub trait OverlayRenderer {
    /// Number of frames with annotation data.
    fn frame_count(&self) -> usize;

    /// Prepares the annotation data; called once before the first render.
    fn prepare(&mut self) {}

    /// Draws the annotation for a 1-based frame.
    fn render(&mut self, frame_number: u64);

    /// Removes anything drawn.
    fn clear(&mut self);
}

/// Labels, buttons, and overlay of a DOM player.
pub struct DomView {
    frame_label: HtmlElement,
    time_label: HtmlElement,
    play_button: HtmlElement,
    controls: HtmlElement,
    overlay: Option<Box<dyn OverlayRenderer>>,
}

impl core::fmt::Debug for DomView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomView")
            .field("has_overlay", &self.overlay.is_some())
            .finish_non_exhaustive()
    }
}

impl DomView {
    /// Creates a view over existing elements.
    #[must_use]
    pub fn new(
        frame_label: HtmlElement,
        time_label: HtmlElement,
        play_button: HtmlElement,
        controls: HtmlElement,
    ) -> Self {
        Self {
            frame_label,
            time_label,
            play_button,
            controls,
            overlay: None,
        }
    }

    /// Replaces the overlay renderer, clearing the old one.
    pub fn set_overlay(&mut self, overlay: Option<Box<dyn OverlayRenderer>>) {
        if let Some(old) = &mut self.overlay {
            old.clear();
        }
        self.overlay = overlay;
    }

    /// The control strip element.
    #[must_use]
    pub fn controls(&self) -> &HtmlElement {
        &self.controls
    }

    /// The play/pause button element.
    #[must_use]
    pub fn play_button(&self) -> &HtmlElement {
        &self.play_button
    }
}

impl PlayerView for DomView {
    fn overlay_frame_count(&self) -> Option<usize> {
        self.overlay.as_ref().map(|overlay| overlay.frame_count())
    }

    fn prepare_overlay(&mut self) {
        if let Some(overlay) = &mut self.overlay {
            overlay.prepare();
        }
    }

    fn render_frame(&mut self, frame: &FrameDisplay) {
        self.frame_label.set_text_content(Some(&frame.frame_label));
        self.time_label.set_text_content(Some(&frame.time_label));
        if let Some(overlay) = &mut self.overlay {
            overlay.render(frame.frame_number);
        }
    }

    fn clear_overlay(&mut self) {
        if let Some(overlay) = &mut self.overlay {
            overlay.clear();
        }
    }

    fn set_play_button(&mut self, playing: bool) {
        let (label, state) = if playing {
            ("Pause", "playing")
        } else {
            ("Play", "paused")
        };
        self.play_button.set_text_content(Some(label));
        if let Err(err) = self.play_button.set_attribute("data-state", state) {
            log::warn!("setting play button state failed: {err:?}");
        }
    }

    fn set_controls_visible(&mut self, visible: bool) {
        let visibility = if visible { "visible" } else { "hidden" };
        if let Err(err) = self.controls.style().set_property("visibility", visibility) {
            log::warn!("setting controls visibility failed: {err:?}");
        }
    }

    fn controls_bounds(&self) -> Option<Rect> {
        let r = self.controls.get_bounding_client_rect();
        let bounds = Rect::new(r.left(), r.top(), r.right(), r.bottom());
        (bounds.area() > 0.0).then_some(bounds)
    }
}
