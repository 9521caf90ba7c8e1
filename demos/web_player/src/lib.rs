// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web demo: a frame-accurate player locked to a media fragment.
//!
//! The video source carries a `#t=2,4` fragment, so playback starts at two
//! seconds and stops (or loops) at four. A frame stamp overlay shows which
//! annotation frame is on screen, and controller notifications and trace
//! events go to the browser console.
//!
//! Build with: `wasm-pack build --target web demos/web_player`
//! Then serve `demos/web_player/` and open `index.html`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;

use framelock_backend_web::{OverlayRenderer, PlayerElements, WebPlayer};
use framelock_core::fragment::FragmentError;
use framelock_core::notify::{Notification, Propagation};
use framelock_core::state::PlayerConfig;
use framelock_core::trace::{FragmentResetTrace, FrameRateTrace, IntentTrace, TraceSink};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, HtmlInputElement, HtmlVideoElement};

const VIDEO_URL: &str = "https://github.com/vidanov/video/raw/master/test_files/1080p50.mp4#t=2,4";
const FRAME_RATE: f64 = 50.0;
/// One annotation per frame of the ten second clip.
const ANNOTATED_FRAMES: usize = 500;

/// Draws the current frame number into a corner badge.
struct FrameStamp {
    badge: HtmlElement,
    frames: usize,
}

impl OverlayRenderer for FrameStamp {
    fn frame_count(&self) -> usize {
        self.frames
    }

    fn prepare(&mut self) {
        if let Err(err) = self.badge.style().set_property("display", "block") {
            log::warn!("showing frame stamp failed: {err:?}");
        }
    }

    fn render(&mut self, frame_number: u64) {
        self.badge
            .set_text_content(Some(&format!("annotation #{frame_number}")));
    }

    fn clear(&mut self) {
        self.badge.set_text_content(None);
    }
}

/// Forwards the interesting trace events to `log`.
struct ConsoleTrace;

impl TraceSink for ConsoleTrace {
    fn on_fragment_reset(&mut self, e: &FragmentResetTrace) {
        log::debug!(
            "fragment end at frame {} (end {}), looped: {}",
            e.candidate,
            e.end_frame,
            e.looped
        );
    }

    fn on_intent(&mut self, e: &IntentTrace) {
        log::debug!("intent playing={} ({:?})", e.playing, e.cause);
    }

    fn on_frame_rate(&mut self, e: &FrameRateTrace) {
        log::info!("frame rate {:.3} from {:?}", e.frame_rate, e.source);
    }

    fn on_fragment_error(&mut self, error: &FragmentError) {
        log::warn!("ignoring media fragment: {error}");
    }
}

/// Entry point for the web player demo.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    if framelock_backend_web::init_logger(log::LevelFilter::Debug).is_err() {
        web_sys::console::warn_1(&"a logger was already installed".into());
    }

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let root = element(&document, "div")?;
    root.set_tab_index(0);
    style(
        &root,
        "position: relative; width: 848px; height: 480px; margin: 24px auto; border-radius: 14px; overflow: hidden; background: #10121f; outline: none;",
    )?;
    body.append_child(&root)?;

    let video: HtmlVideoElement = document.create_element("video")?.unchecked_into();
    video.set_src(VIDEO_URL);
    video.set_controls(false);
    video.set_muted(true);
    video.set_preload("auto");
    video.set_attribute("playsinline", "")?;
    style(
        &video,
        "width: 100%; height: 100%; object-fit: contain; display: block;",
    )?;
    root.append_child(&video)?;

    let badge = element(&document, "div")?;
    style(
        &badge,
        "display: none; position: absolute; top: 12px; right: 12px; padding: 4px 10px; border-radius: 6px; background: rgba(0,0,0,0.6); color: #9ef0c4; font: 12px/1.4 ui-monospace, monospace; pointer-events: none;",
    )?;
    root.append_child(&badge)?;

    let controls = element(&document, "div")?;
    style(
        &controls,
        "position: absolute; left: 0; right: 0; bottom: 0; display: grid; grid-template-columns: auto 1fr auto auto; gap: 12px; align-items: center; padding: 10px 14px; background: linear-gradient(transparent, rgba(0,0,0,0.7)); color: #eff8ff; font: 13px/1 ui-monospace, monospace;",
    )?;
    root.append_child(&controls)?;

    let play_button = element(&document, "button")?;
    play_button.set_text_content(Some("Play"));
    style(
        &play_button,
        "border: 0; border-radius: 999px; padding: 8px 16px; background: #0f5d71; color: #eff8ff; font-weight: 600; cursor: pointer;",
    )?;
    controls.append_child(&play_button)?;

    let seek: HtmlInputElement = document.create_element("input")?.unchecked_into();
    seek.set_type("range");
    seek.set_min("0");
    seek.set_max(&format!("{}", PlayerConfig::DEFAULT_SEEK_BAR_MAX));
    seek.set_step("any");
    seek.set_value("0");
    style(&seek, "width: 100%;")?;
    controls.append_child(&seek)?;

    let frame_label = element(&document, "span")?;
    controls.append_child(&frame_label)?;
    let time_label = element(&document, "span")?;
    controls.append_child(&time_label)?;

    let config = PlayerConfig {
        frame_rate: Some(FRAME_RATE),
        ..PlayerConfig::default()
    };
    let player = WebPlayer::attach_traced(
        PlayerElements {
            root,
            video,
            seek,
            play_button,
            controls,
            frame_label,
            time_label,
        },
        config,
        Box::new(ConsoleTrace),
    )?;

    player.set_overlay(Some(Box::new(FrameStamp {
        badge,
        frames: ANNOTATED_FRAMES,
    })));

    player.subscribe(|notification| {
        match notification {
            Notification::TimeUpdate { frame_number } => {
                log::trace!("time update, frame {frame_number}");
            }
            other => log::info!("{other:?}"),
        }
        Propagation::Continue
    });

    // The player lives as long as the page.
    core::mem::forget(player);

    Ok(())
}

fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

fn style(el: &web_sys::Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}
